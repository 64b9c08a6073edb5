/*
 *  Copyright 2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Domain models for the vault backend.
//!
//! These types are backend-agnostic; SQLite row representations and the
//! conversions between the two live in the DAL.

pub mod batch;
pub mod bundle;
pub mod notification;
pub mod object_id;

pub use batch::BatchStatus;
pub use bundle::{Bundle, BundleStatus, ExpireBy, NewBundle, ProgressInfo};
pub use notification::Notification;
pub use object_id::ObjectId;

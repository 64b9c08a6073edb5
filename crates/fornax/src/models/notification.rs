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

//! Notification subscription model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A pending email subscription for a bundle.
///
/// Subscriptions are created by cook requests that carry an email
/// address and deleted one by one as their notification is successfully
/// dispatched after a terminal transition.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub bundle_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

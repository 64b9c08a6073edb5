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

//! Database layer: connection pooling, schema and migrations.

pub mod connection;
pub mod schema;

pub use connection::Database;

use diesel_migrations::{embed_migrations, EmbeddedMigrations};

/// Embedded SQLite migrations, applied by [`Database::run_migrations`].
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

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

//! SQLite-specific database models.
//!
//! Diesel model definitions using SQLite-compatible types: UUIDs are
//! stored as BLOB (`Vec<u8>`), timestamps as TEXT (RFC3339 strings) and
//! booleans as INTEGER (0/1). These models are used internally by the
//! DAL and converted to/from domain types at the DAL boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::database::schema::{batch_memberships, batches, bundles, notifications};
use crate::models::bundle::{Bundle, BundleStatus, NewBundle};
use crate::models::notification::Notification;
use crate::models::object_id::ObjectId;

// ============================================================================
// Bundle Models
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bundles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SqliteBundle {
    pub id: Vec<u8>,
    pub object_type: String,
    pub object_id: Vec<u8>,
    pub task_id: Option<String>,
    pub task_status: String,
    pub sticky: i32,
    pub ts_created: String,
    pub ts_done: Option<String>,
    pub ts_last_access: String,
    pub progress_msg: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bundles)]
pub struct NewSqliteBundle {
    pub id: Vec<u8>,
    pub object_type: String,
    pub object_id: Vec<u8>,
    pub task_status: String,
    pub sticky: i32,
    pub ts_created: String,
    pub ts_last_access: String,
}

impl NewSqliteBundle {
    /// Builds an insertable row for a fresh bundle in status `new`.
    pub fn from_new(new: &NewBundle) -> Self {
        let now = current_timestamp_string();
        NewSqliteBundle {
            id: uuid_to_blob(&Uuid::new_v4()),
            object_type: new.object_type.clone(),
            object_id: new.object_id.as_bytes().to_vec(),
            task_status: BundleStatus::New.as_str().to_string(),
            sticky: if new.sticky { 1 } else { 0 },
            ts_created: now.clone(),
            ts_last_access: now,
        }
    }
}

// ============================================================================
// Batch Models
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = batches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SqliteBatch {
    pub id: Vec<u8>,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = batches)]
pub struct NewSqliteBatch {
    pub id: Vec<u8>,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = batch_memberships)]
pub struct NewSqliteBatchMembership {
    pub batch_id: Vec<u8>,
    pub bundle_id: Vec<u8>,
    pub position: i32,
}

// ============================================================================
// Notification Models
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SqliteNotification {
    pub id: Vec<u8>,
    pub bundle_id: Vec<u8>,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewSqliteNotification {
    pub id: Vec<u8>,
    pub bundle_id: Vec<u8>,
    pub email: String,
    pub created_at: String,
}

// ============================================================================
// Conversion Utilities
// ============================================================================

/// Convert a UUID to SQLite BLOB format (`Vec<u8>`)
pub fn uuid_to_blob(uuid: &Uuid) -> Vec<u8> {
    uuid.as_bytes().to_vec()
}

/// Convert SQLite BLOB to UUID
pub fn blob_to_uuid(blob: &[u8]) -> Result<Uuid, uuid::Error> {
    Uuid::from_slice(blob)
}

/// Convert `DateTime<Utc>` to RFC3339 string for SQLite storage
pub fn datetime_to_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse RFC3339 string from SQLite to `DateTime<Utc>`
pub fn string_to_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Current timestamp as RFC3339 string
pub fn current_timestamp_string() -> String {
    Utc::now().to_rfc3339()
}

// ============================================================================
// Conversion Implementations: SQLite models <-> Domain models
// ============================================================================

impl From<SqliteBundle> for Bundle {
    fn from(s: SqliteBundle) -> Self {
        Bundle {
            id: blob_to_uuid(&s.id).expect("Invalid UUID in database"),
            object_type: s.object_type,
            object_id: ObjectId::from_bytes(s.object_id),
            task_id: s.task_id,
            status: s
                .task_status
                .parse()
                .expect("Invalid task status in database"),
            sticky: s.sticky != 0,
            ts_created: string_to_datetime(&s.ts_created)
                .expect("Invalid timestamp in database"),
            ts_done: s
                .ts_done
                .map(|ts| string_to_datetime(&ts).expect("Invalid timestamp in database")),
            ts_last_access: string_to_datetime(&s.ts_last_access)
                .expect("Invalid timestamp in database"),
            progress_msg: s.progress_msg,
        }
    }
}

impl From<SqliteNotification> for Notification {
    fn from(s: SqliteNotification) -> Self {
        Notification {
            id: blob_to_uuid(&s.id).expect("Invalid UUID in database"),
            bundle_id: blob_to_uuid(&s.bundle_id).expect("Invalid UUID in database"),
            email: s.email,
            created_at: string_to_datetime(&s.created_at)
                .expect("Invalid timestamp in database"),
        }
    }
}

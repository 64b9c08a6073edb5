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

//! Bundle domain models.
//!
//! A bundle is the produced archive artifact for one
//! (object_type, object_id) pair. The bundle row is the authoritative
//! lifecycle record: a row in any state other than `Failed` means a cook
//! is in flight or complete, and no new task may be submitted for the
//! pair.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::object_id::ObjectId;

/// Lifecycle state of a bundle.
///
/// Transitions: `New` → `Pending` → {`Done`, `Failed`}. A failed bundle
/// is deleted and recreated on retry; a done bundle is terminal until
/// evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleStatus {
    /// Row created, cooking not started.
    New,
    /// A cooker worker has picked up the task.
    Pending,
    /// The artifact has been produced.
    Done,
    /// Cooking failed; progress_msg carries the reason.
    Failed,
}

impl BundleStatus {
    /// Storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleStatus::New => "new",
            BundleStatus::Pending => "pending",
            BundleStatus::Done => "done",
            BundleStatus::Failed => "failed",
        }
    }

    /// Whether this status ends the cooking lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BundleStatus::Done | BundleStatus::Failed)
    }
}

impl FromStr for BundleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(BundleStatus::New),
            "pending" => Ok(BundleStatus::Pending),
            "done" => Ok(BundleStatus::Done),
            "failed" => Ok(BundleStatus::Failed),
            other => Err(format!("unknown bundle status: {}", other)),
        }
    }
}

impl fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp axis used by the cache expiration methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireBy {
    /// Order by bundle creation time.
    Created,
    /// Order by completion time.
    Done,
    /// Order by last fetch time.
    LastAccess,
}

/// A bundle row, as read back from the store.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub id: Uuid,
    pub object_type: String,
    pub object_id: ObjectId,
    pub task_id: Option<String>,
    pub status: BundleStatus,
    pub sticky: bool,
    pub ts_created: DateTime<Utc>,
    pub ts_done: Option<DateTime<Utc>>,
    pub ts_last_access: DateTime<Utc>,
    pub progress_msg: Option<String>,
}

/// Fields required to create a bundle row.
#[derive(Debug, Clone)]
pub struct NewBundle {
    pub object_type: String,
    pub object_id: ObjectId,
    pub sticky: bool,
}

/// Externally visible progress record for one bundle.
///
/// The storage column is named `task_status`; the external contract
/// consistently exposes it as `status`.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressInfo {
    pub object_type: String,
    /// Hex form of the object identifier.
    pub object_id: String,
    pub task_id: Option<String>,
    pub status: BundleStatus,
    pub sticky: bool,
    pub ts_created: DateTime<Utc>,
    pub ts_done: Option<DateTime<Utc>>,
    pub ts_last_access: DateTime<Utc>,
    pub progress_msg: Option<String>,
}

impl From<Bundle> for ProgressInfo {
    fn from(bundle: Bundle) -> Self {
        ProgressInfo {
            object_type: bundle.object_type,
            object_id: bundle.object_id.to_hex(),
            task_id: bundle.task_id,
            status: bundle.status,
            sticky: bundle.sticky,
            ts_created: bundle.ts_created,
            ts_done: bundle.ts_done,
            ts_last_access: bundle.ts_last_access,
            progress_msg: bundle.progress_msg,
        }
    }
}

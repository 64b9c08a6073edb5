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

//! Batch domain models.
//!
//! A batch is a fixed set of bundles registered in one call. Its member
//! set never changes after creation; it exists purely for aggregate
//! progress reporting.

use serde::Serialize;

use super::bundle::{BundleStatus, ProgressInfo};

/// Aggregate progress report for a batch.
///
/// Per-bundle records are listed in batch insertion order; the counters
/// partition `total` by status.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStatus {
    pub bundles: Vec<ProgressInfo>,
    pub total: usize,
    pub new: usize,
    pub pending: usize,
    pub done: usize,
    pub failed: usize,
}

impl BatchStatus {
    /// Builds the aggregate report from per-bundle records.
    pub fn from_bundles(bundles: Vec<ProgressInfo>) -> Self {
        let mut status = BatchStatus {
            total: bundles.len(),
            bundles,
            new: 0,
            pending: 0,
            done: 0,
            failed: 0,
        };
        for bundle in &status.bundles {
            match bundle.status {
                BundleStatus::New => status.new += 1,
                BundleStatus::Pending => status.pending += 1,
                BundleStatus::Done => status.done += 1,
                BundleStatus::Failed => status.failed += 1,
            }
        }
        status
    }
}

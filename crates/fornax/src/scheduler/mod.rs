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

//! Cooking task submission.
//!
//! The vault never runs cookers itself; it hands one-shot cooking tasks
//! to an external scheduler through this seam and records the returned
//! task ids on the bundle rows.

use async_trait::async_trait;
use thiserror::Error;

/// Task name for single-bundle cooking.
pub const COOKING_TASK_NAME: &str = "cook-bundle";

/// Task name for batch cooking.
pub const BATCH_COOKING_TASK_NAME: &str = "batch-cook-bundle";

/// Error returned when task submission fails.
///
/// A failed submission leaves the bundle row in status `new` with no
/// task id; the next cook request for the pair retries the submission.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubmitError(pub String);

/// One-shot cooking task submission.
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Submits a single cooking task and returns its task id.
    async fn submit(
        &self,
        task_name: &str,
        object_type: &str,
        hex_id: &str,
    ) -> Result<String, SubmitError>;

    /// Submits one cooking task per (object_type, hex_id) pair and
    /// returns the task ids in the same order.
    async fn submit_batch(
        &self,
        task_name: &str,
        requests: &[(String, String)],
    ) -> Result<Vec<String>, SubmitError>;
}

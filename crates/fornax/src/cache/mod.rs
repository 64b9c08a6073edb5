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

//! Artifact cache.
//!
//! Content-addressed blob storage for produced bundles, keyed by
//! (object_type, object_id). The cache has no TTL of its own; eviction
//! is driven externally by the coordinator's expiration methods.

mod filesystem;

pub use filesystem::FilesystemBundleCache;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::object_id::ObjectId;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Underlying filesystem I/O failure.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache root could not be prepared.
    #[error("cache root unavailable: {0}")]
    Root(String),
}

/// Blob storage interface for bundle artifacts.
///
/// Implementations must tolerate repeated puts for the same key
/// (last write wins) and deletes of absent keys.
#[async_trait]
pub trait BundleCache: Send + Sync {
    /// Stores the artifact for a key, replacing any previous content.
    async fn put(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        data: Vec<u8>,
    ) -> Result<(), CacheError>;

    /// Retrieves the artifact for a key.
    async fn get(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<Option<Vec<u8>>, CacheError>;

    /// Checks whether an artifact is present for a key.
    async fn has(&self, object_type: &str, object_id: &ObjectId) -> Result<bool, CacheError>;

    /// Removes the artifact for a key. Absent keys are not an error.
    async fn delete(&self, object_type: &str, object_id: &ObjectId) -> Result<(), CacheError>;
}

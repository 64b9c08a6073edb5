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

//! Filesystem-backed artifact cache.
//!
//! Artifacts live under `<root>/<object_type>/<aa>/<bb>/<hex>` where
//! `aa`/`bb` are the first two byte pairs of the hex id, fanning the
//! tree out to keep directories small. Writes go through a temporary
//! sibling file and a rename, so readers never observe partial blobs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{BundleCache, CacheError};
use crate::models::object_id::ObjectId;

/// Filesystem blob store for bundle artifacts.
#[derive(Debug, Clone)]
pub struct FilesystemBundleCache {
    root: PathBuf,
}

impl FilesystemBundleCache {
    /// Creates a cache rooted at the given directory, creating it if
    /// needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| CacheError::Root(format!("{}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, object_type: &str, object_id: &ObjectId) -> PathBuf {
        let hex = object_id.to_hex();
        let mut path = self.root.join(object_type);
        if hex.len() >= 4 {
            path = path.join(&hex[0..2]).join(&hex[2..4]);
        }
        path.join(hex)
    }
}

#[async_trait]
impl BundleCache for FilesystemBundleCache {
    async fn put(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        data: Vec<u8>,
    ) -> Result<(), CacheError> {
        let path = self.blob_path(object_type, object_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        debug!(object_type, object_id = %object_id, size = data.len(), "cached bundle artifact");
        Ok(())
    }

    async fn get(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.blob_path(object_type, object_id);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn has(&self, object_type: &str, object_id: &ObjectId) -> Result<bool, CacheError> {
        let path = self.blob_path(object_type, object_id);
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, object_type: &str, object_id: &ObjectId) -> Result<(), CacheError> {
        let path = self.blob_path(object_type, object_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

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

//! Cooker directory.
//!
//! Cookers are the opaque workers that produce bundle artifacts; this
//! crate only needs to know which object types have a cooker and how to
//! ask one whether its source object exists. The actual cooking happens
//! out of process: a submitted task eventually calls back into the
//! vault through `put_bundle`, `set_progress` and `set_status`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::VaultError;
use crate::models::object_id::ObjectId;

/// Existence check for archive objects of one object type.
#[async_trait]
pub trait Cooker: Send + Sync {
    /// Whether the archive holds the object this bundle would be cooked
    /// from. Cook requests for absent objects are rejected up front.
    async fn check_exists(&self, object_id: &ObjectId) -> Result<bool, VaultError>;
}

/// Registry mapping object-type names to their cooker.
///
/// The registered type names are the vocabulary of the whole backend:
/// a cook request for a type without a cooker fails with `UnknownType`.
#[derive(Default)]
pub struct CookerRegistry {
    inner: RwLock<HashMap<String, Arc<dyn Cooker>>>,
}

impl CookerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cooker for an object type, replacing any previous
    /// registration for the same name.
    pub fn register(&self, object_type: impl Into<String>, cooker: Arc<dyn Cooker>) {
        let object_type = object_type.into();
        debug!(object_type, "registered cooker");
        self.inner.write().insert(object_type, cooker);
    }

    /// Whether a cooker is registered for the object type.
    pub fn contains(&self, object_type: &str) -> bool {
        self.inner.read().contains_key(object_type)
    }

    /// Returns the cooker for an object type.
    pub fn get(&self, object_type: &str) -> Option<Arc<dyn Cooker>> {
        self.inner.read().get(object_type).cloned()
    }

    /// All registered object-type names.
    pub fn object_types(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }
}

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

//! Object identifiers.
//!
//! Archive objects are addressed by an opaque binary digest. Callers hand
//! identifiers around in hex; storage keys them in binary. `ObjectId` is
//! the single reconciliation point between the two forms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of the abbreviated hex form used in mail subjects.
const SHORT_HEX_LEN: usize = 7;

/// An opaque binary object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Vec<u8>);

impl ObjectId {
    /// Creates an identifier from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parses an identifier from its hex representation.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }

    /// The raw binary form, as stored in the bundle table and cache keys.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The full hex form, as used in task arguments, URLs and mail bodies.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Abbreviated hex form for human-facing labels (mail subjects).
    pub fn short_hex(&self) -> String {
        let hex = self.to_hex();
        let cut = hex.len().min(SHORT_HEX_LEN);
        hex[..cut].to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<Vec<u8>> for ObjectId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ObjectId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

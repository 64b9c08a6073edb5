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

//! Error types for the vault backend.
//!
//! `VaultError` is the error surface of the public API. Subsystem errors
//! (`CacheError`, `MailerError`, `SubmitError`) convert into it at the
//! coordinator boundary.

use thiserror::Error;

use crate::cache::CacheError;
use crate::notify::MailerError;
use crate::scheduler::SubmitError;

/// Errors surfaced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A cook request named an object type with no registered cooker.
    #[error("unknown object type: {0}")]
    UnknownType(String),

    /// A bundle or batch does not exist, or the underlying archive
    /// object is absent.
    #[error("{0}")]
    NotFound(String),

    /// Notification dispatch was requested for a bundle that is not in
    /// a terminal state.
    #[error("{0}")]
    Precondition(String),

    /// Database query error.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Connection pool error (checkout or interact failure).
    #[error("connection pool error: {0}")]
    ConnectionPool(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Artifact cache I/O error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Cooking task submission error.
    #[error("task submission error: {0}")]
    Scheduler(#[from] SubmitError),

    /// Mail transport error.
    #[error("mail error: {0}")]
    Mail(#[from] MailerError),
}

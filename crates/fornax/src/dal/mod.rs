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

//! Data Access Layer
//!
//! This module provides the SQLite implementation of the data access
//! layer for the vault tables. Row models use SQLite-compatible types
//! and are converted to domain types at the DAL boundary. Operations
//! that touch more than one row run inside a single transaction.

pub mod batch;
pub mod bundle;
pub mod models;
pub mod notification;

use crate::database::Database;
use batch::BatchDAL;
use bundle::BundleDAL;
use notification::NotificationDAL;

/// The main Data Access Layer struct.
#[derive(Clone)]
pub struct DAL {
    /// Shared database handle.
    pub database: Database,
}

impl DAL {
    /// Creates a new DAL instance over the provided database.
    pub fn new(database: Database) -> Self {
        DAL { database }
    }

    /// Returns a BundleDAL instance for bundle-row operations.
    pub fn bundles(&self) -> BundleDAL {
        BundleDAL { dal: self }
    }

    /// Returns a BatchDAL instance for batch bookkeeping operations.
    pub fn batches(&self) -> BatchDAL {
        BatchDAL { dal: self }
    }

    /// Returns a NotificationDAL instance for subscription operations.
    pub fn notifications(&self) -> NotificationDAL {
        NotificationDAL { dal: self }
    }
}

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

//! Database connection management.
//!
//! This module provides an async connection pool over SQLite using
//! `deadpool-diesel`. It handles pooling, URL normalization and the
//! embedded-migration runner.
//!
//! # Example
//!
//! ```rust,no_run
//! use fornax::database::Database;
//!
//! # async fn example() -> Result<(), fornax::VaultError> {
//! let db = Database::new("/var/lib/fornax/vault.db");
//! db.run_migrations().await?;
//! # Ok(())
//! # }
//! ```

use deadpool_diesel::sqlite::{Manager, Pool, Runtime};
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use tracing::info;

use crate::error::VaultError;

/// A pool of SQLite database connections.
///
/// The struct is `Clone`; each clone references the same underlying
/// pool and can be shared freely between tasks.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database(sqlite)")
    }
}

impl Database {
    /// Creates a new connection pool for the given SQLite location.
    ///
    /// Accepts a `sqlite://` URL, a plain file path, a `file:` URI or
    /// `:memory:`.
    ///
    /// # Panics
    ///
    /// Panics if the connection pool cannot be created.
    pub fn new(connection_string: &str) -> Self {
        let url = Self::build_sqlite_url(connection_string);
        let manager = Manager::new(url, Runtime::Tokio1);
        // SQLite has limited concurrent write support even with WAL
        // mode. A single connection avoids "database is locked" errors.
        let pool = Pool::builder(manager)
            .max_size(1)
            .build()
            .expect("Failed to create SQLite connection pool");

        info!("SQLite connection pool initialized (size: 1)");

        Self { pool }
    }

    /// Returns a clone of the connection pool.
    pub fn pool(&self) -> Pool {
        self.pool.clone()
    }

    /// Strips the `sqlite://` prefix if present.
    fn build_sqlite_url(connection_string: &str) -> String {
        if let Some(path) = connection_string.strip_prefix("sqlite://") {
            path.to_string()
        } else {
            connection_string.to_string()
        }
    }

    /// Runs pending database migrations.
    ///
    /// Also applies the WAL and busy-timeout pragmas on the pooled
    /// connection before migrating.
    pub async fn run_migrations(&self) -> Result<(), VaultError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        conn.interact(|conn| -> Result<(), VaultError> {
            // WAL mode allows concurrent reads during writes.
            diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
            // Wait on locks instead of failing immediately.
            diesel::sql_query("PRAGMA busy_timeout=30000;").execute(conn)?;
            diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;

            conn.run_pending_migrations(super::MIGRATIONS)
                .map_err(|e| VaultError::Migration(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(())
    }
}

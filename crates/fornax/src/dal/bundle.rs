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

//! Bundle Data Access Layer
//!
//! This module provides the data access layer for bundle lifecycle rows.
//!
//! Key features:
//! - Insert-or-read creation keyed on the unique (object_type, object_id)
//!   index, which makes concurrent cook requests coalesce on one row
//! - Status and progress mutators for cooker workers
//! - Last-access touching for the eviction policy
//! - Atomic selection and deletion of expirable rows

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::models::{
    current_timestamp_string, datetime_to_string, NewSqliteBundle, SqliteBundle,
};
use super::DAL;
use crate::database::schema::bundles;
use crate::error::VaultError;
use crate::models::bundle::{Bundle, BundleStatus, ExpireBy, NewBundle};
use crate::models::object_id::ObjectId;

/// Data Access Layer for bundle-row operations.
pub struct BundleDAL<'a> {
    pub dal: &'a DAL,
}

impl<'a> BundleDAL<'a> {
    /// Retrieves a bundle by its (object_type, object_id) key.
    ///
    /// # Returns
    /// * `Ok(None)` if no bundle row exists for the pair
    pub async fn get(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<Option<Bundle>, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let object_type = object_type.to_string();
        let object_id = object_id.as_bytes().to_vec();
        let row: Option<SqliteBundle> = conn
            .interact(move |conn| {
                bundles::table
                    .filter(
                        bundles::object_type
                            .eq(object_type)
                            .and(bundles::object_id.eq(object_id)),
                    )
                    .select(SqliteBundle::as_select())
                    .first(conn)
                    .optional()
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(row.map(Into::into))
    }

    /// Creates a bundle row in status `new`, or returns the existing row.
    ///
    /// The insert is an insert-or-ignore against the unique
    /// (object_type, object_id) index followed by a read-back in the
    /// same transaction. Concurrent callers for the same pair all
    /// observe a single row: the first insert wins, every other call
    /// reads it.
    pub async fn create_if_absent(&self, new: &NewBundle) -> Result<Bundle, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let row = NewSqliteBundle::from_new(new);
        let bundle: SqliteBundle = conn
            .interact(move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    diesel::insert_or_ignore_into(bundles::table)
                        .values(&row)
                        .execute(conn)?;

                    bundles::table
                        .filter(
                            bundles::object_type
                                .eq(row.object_type.as_str())
                                .and(bundles::object_id.eq(row.object_id.as_slice())),
                        )
                        .select(SqliteBundle::as_select())
                        .first(conn)
                })
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(bundle.into())
    }

    /// Deletes the bundle row for the pair if it is in status `failed`.
    ///
    /// This is the retry path: a failed bundle must be removed before a
    /// fresh row (and a fresh task) can take its place.
    ///
    /// # Returns
    /// * `Ok(true)` if a failed row was deleted
    pub async fn delete_if_failed(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<bool, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let object_type = object_type.to_string();
        let object_id = object_id.as_bytes().to_vec();
        let deleted = conn
            .interact(move |conn| {
                diesel::delete(
                    bundles::table.filter(
                        bundles::object_type
                            .eq(object_type)
                            .and(bundles::object_id.eq(object_id))
                            .and(bundles::task_status.eq(BundleStatus::Failed.as_str())),
                    ),
                )
                .execute(conn)
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(deleted > 0)
    }

    /// Records the submitted task id on a bundle row.
    pub async fn record_task_id(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        task_id: &str,
    ) -> Result<(), VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let object_type = object_type.to_string();
        let object_id = object_id.as_bytes().to_vec();
        let task_id = task_id.to_string();
        conn.interact(move |conn| {
            diesel::update(
                bundles::table.filter(
                    bundles::object_type
                        .eq(object_type)
                        .and(bundles::object_id.eq(object_id)),
                ),
            )
            .set(bundles::task_id.eq(task_id))
            .execute(conn)
        })
        .await
        .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Updates the task status of a bundle.
    ///
    /// Transitioning to `done` also stamps `ts_done`.
    ///
    /// # Returns
    /// * `Ok(true)` if a row was updated
    pub async fn set_status(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        status: BundleStatus,
    ) -> Result<bool, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let object_type = object_type.to_string();
        let object_id = object_id.as_bytes().to_vec();
        let now = current_timestamp_string();
        let updated = conn
            .interact(move |conn| {
                let target = bundles::table.filter(
                    bundles::object_type
                        .eq(object_type)
                        .and(bundles::object_id.eq(object_id)),
                );

                if status == BundleStatus::Done {
                    diesel::update(target)
                        .set((
                            bundles::task_status.eq(status.as_str()),
                            bundles::ts_done.eq(Some(now)),
                        ))
                        .execute(conn)
                } else {
                    diesel::update(target)
                        .set(bundles::task_status.eq(status.as_str()))
                        .execute(conn)
                }
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(updated > 0)
    }

    /// Updates the progress message of a bundle.
    ///
    /// # Returns
    /// * `Ok(true)` if a row was updated
    pub async fn set_progress(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        progress: &str,
    ) -> Result<bool, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let object_type = object_type.to_string();
        let object_id = object_id.as_bytes().to_vec();
        let progress = progress.to_string();
        let updated = conn
            .interact(move |conn| {
                diesel::update(
                    bundles::table.filter(
                        bundles::object_type
                            .eq(object_type)
                            .and(bundles::object_id.eq(object_id)),
                    ),
                )
                .set(bundles::progress_msg.eq(Some(progress)))
                .execute(conn)
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(updated > 0)
    }

    /// Stamps the last-access timestamp of a bundle.
    ///
    /// Called on every successful fetch; the eviction policy orders on
    /// this column.
    pub async fn touch(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<(), VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let object_type = object_type.to_string();
        let object_id = object_id.as_bytes().to_vec();
        let now = current_timestamp_string();
        conn.interact(move |conn| {
            diesel::update(
                bundles::table.filter(
                    bundles::object_type
                        .eq(object_type)
                        .and(bundles::object_id.eq(object_id)),
                ),
            )
            .set(bundles::ts_last_access.eq(now))
            .execute(conn)
        })
        .await
        .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Deletes the `n` oldest non-sticky bundle rows on the given
    /// timestamp axis and returns them.
    pub async fn evict_oldest(
        &self,
        by: ExpireBy,
        n: i64,
    ) -> Result<Vec<Bundle>, VaultError> {
        self.evict(by, Some(n), None).await
    }

    /// Deletes every non-sticky bundle row whose timestamp on the given
    /// axis is at or before `cutoff`, and returns them.
    pub async fn evict_until(
        &self,
        by: ExpireBy,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Bundle>, VaultError> {
        self.evict(by, None, Some(cutoff)).await
    }

    /// Selection and row deletion run in one transaction. Ordering is
    /// the named timestamp ascending, ties broken by
    /// (object_type, object_id) ascending for determinism.
    async fn evict(
        &self,
        by: ExpireBy,
        limit: Option<i64>,
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<Vec<Bundle>, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let cutoff = cutoff.map(|ts| datetime_to_string(&ts));
        let rows: Vec<SqliteBundle> = conn
            .interact(move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    let mut query = bundles::table
                        .select(SqliteBundle::as_select())
                        .filter(bundles::sticky.eq(0))
                        .into_boxed();

                    query = match by {
                        ExpireBy::Created => {
                            if let Some(ref cutoff) = cutoff {
                                query = query.filter(bundles::ts_created.le(cutoff.clone()));
                            }
                            query.order((
                                bundles::ts_created.asc(),
                                bundles::object_type.asc(),
                                bundles::object_id.asc(),
                            ))
                        }
                        ExpireBy::Done => {
                            if let Some(ref cutoff) = cutoff {
                                query = query.filter(bundles::ts_done.le(cutoff.clone()));
                            }
                            query.order((
                                bundles::ts_done.asc(),
                                bundles::object_type.asc(),
                                bundles::object_id.asc(),
                            ))
                        }
                        ExpireBy::LastAccess => {
                            if let Some(ref cutoff) = cutoff {
                                query =
                                    query.filter(bundles::ts_last_access.le(cutoff.clone()));
                            }
                            query.order((
                                bundles::ts_last_access.asc(),
                                bundles::object_type.asc(),
                                bundles::object_id.asc(),
                            ))
                        }
                    };

                    if let Some(limit) = limit {
                        query = query.limit(limit);
                    }

                    let rows: Vec<SqliteBundle> = query.load(conn)?;

                    for row in &rows {
                        diesel::delete(bundles::table.filter(bundles::id.eq(row.id.clone())))
                            .execute(conn)?;
                    }

                    Ok(rows)
                })
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

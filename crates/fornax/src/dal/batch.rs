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

//! Batch Data Access Layer
//!
//! Batch creation is atomic: the batch row, failed-member cleanup,
//! member bundle rows and membership records all land in a single
//! transaction. Membership positions preserve the caller's insertion
//! order for reporting.

use std::collections::HashSet;

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{
    current_timestamp_string, uuid_to_blob, NewSqliteBatch, NewSqliteBatchMembership,
    NewSqliteBundle, SqliteBundle,
};
use super::DAL;
use crate::database::schema::{batch_memberships, batches, bundles};
use crate::error::VaultError;
use crate::models::bundle::{Bundle, BundleStatus, NewBundle};
use crate::models::object_id::ObjectId;

/// Data Access Layer for batch bookkeeping.
pub struct BatchDAL<'a> {
    pub dal: &'a DAL,
}

impl<'a> BatchDAL<'a> {
    /// Creates a batch over the given members and returns its id.
    ///
    /// Within one transaction, for each distinct (object_type,
    /// object_id) pair in input order:
    /// - a `failed` bundle row for the pair is deleted first (retry
    ///   semantics, same rule as single cook);
    /// - a fresh row in status `new` is inserted unless one already
    ///   exists (insert-or-ignore: the batch joins in-flight requests);
    /// - a membership record is added at the next position.
    ///
    /// Duplicated pairs in the input collapse to one member.
    pub async fn create_with_members(
        &self,
        members: Vec<(String, ObjectId)>,
    ) -> Result<Uuid, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let batch_id = Uuid::new_v4();
        let batch_blob = uuid_to_blob(&batch_id);
        conn.interact(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::insert_into(batches::table)
                    .values(&NewSqliteBatch {
                        id: batch_blob.clone(),
                        created_at: current_timestamp_string(),
                    })
                    .execute(conn)?;

                let mut seen: HashSet<(String, Vec<u8>)> = HashSet::new();
                let mut position = 0i32;
                for (object_type, object_id) in &members {
                    let key = (object_type.clone(), object_id.as_bytes().to_vec());
                    if !seen.insert(key) {
                        continue;
                    }

                    diesel::delete(
                        bundles::table.filter(
                            bundles::object_type
                                .eq(object_type.as_str())
                                .and(bundles::object_id.eq(object_id.as_bytes()))
                                .and(bundles::task_status.eq(BundleStatus::Failed.as_str())),
                        ),
                    )
                    .execute(conn)?;

                    let row = NewSqliteBundle::from_new(&NewBundle {
                        object_type: object_type.clone(),
                        object_id: object_id.clone(),
                        sticky: false,
                    });
                    diesel::insert_or_ignore_into(bundles::table)
                        .values(&row)
                        .execute(conn)?;

                    let bundle: SqliteBundle = bundles::table
                        .filter(
                            bundles::object_type
                                .eq(object_type.as_str())
                                .and(bundles::object_id.eq(object_id.as_bytes())),
                        )
                        .select(SqliteBundle::as_select())
                        .first(conn)?;

                    diesel::insert_or_ignore_into(batch_memberships::table)
                        .values(&NewSqliteBatchMembership {
                            batch_id: batch_blob.clone(),
                            bundle_id: bundle.id,
                            position,
                        })
                        .execute(conn)?;
                    position += 1;
                }

                Ok(())
            })
        })
        .await
        .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(batch_id)
    }

    /// Loads the member bundles of a batch, in membership order.
    ///
    /// # Returns
    /// * `Ok(None)` if no batch with this id exists
    pub async fn members(&self, batch_id: Uuid) -> Result<Option<Vec<Bundle>>, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let batch_blob = uuid_to_blob(&batch_id);
        let rows: Option<Vec<SqliteBundle>> = conn
            .interact(move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    let known: i64 = batches::table
                        .filter(batches::id.eq(batch_blob.clone()))
                        .count()
                        .get_result(conn)?;
                    if known == 0 {
                        return Ok(None);
                    }

                    let members: Vec<SqliteBundle> = batch_memberships::table
                        .inner_join(bundles::table)
                        .filter(batch_memberships::batch_id.eq(batch_blob))
                        .order(batch_memberships::position.asc())
                        .select(SqliteBundle::as_select())
                        .load(conn)?;
                    Ok(Some(members))
                })
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(rows.map(|rows| rows.into_iter().map(Into::into).collect()))
    }
}

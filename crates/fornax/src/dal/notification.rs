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

//! Notification subscription Data Access Layer
//!
//! Subscription rows are deleted one at a time, each after its email
//! has been dispatched successfully; a failed dispatch leaves the row
//! in place for a later retry.

use diesel::prelude::*;
use uuid::Uuid;

use super::models::{
    current_timestamp_string, uuid_to_blob, NewSqliteNotification, SqliteNotification,
};
use super::DAL;
use crate::database::schema::notifications;
use crate::error::VaultError;
use crate::models::notification::Notification;

/// Data Access Layer for notification subscriptions.
pub struct NotificationDAL<'a> {
    pub dal: &'a DAL,
}

impl<'a> NotificationDAL<'a> {
    /// Registers an email subscription for a bundle.
    pub async fn add(&self, bundle_id: Uuid, email: &str) -> Result<(), VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let row = NewSqliteNotification {
            id: uuid_to_blob(&Uuid::new_v4()),
            bundle_id: uuid_to_blob(&bundle_id),
            email: email.to_string(),
            created_at: current_timestamp_string(),
        };
        conn.interact(move |conn| {
            diesel::insert_into(notifications::table)
                .values(&row)
                .execute(conn)
        })
        .await
        .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Lists the pending subscriptions for a bundle.
    pub async fn for_bundle(&self, bundle_id: Uuid) -> Result<Vec<Notification>, VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let bundle_blob = uuid_to_blob(&bundle_id);
        let rows: Vec<SqliteNotification> = conn
            .interact(move |conn| {
                notifications::table
                    .filter(notifications::bundle_id.eq(bundle_blob))
                    .order(notifications::created_at.asc())
                    .select(SqliteNotification::as_select())
                    .load(conn)
            })
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Deletes a subscription after its email has been dispatched.
    pub async fn delete(&self, id: Uuid) -> Result<(), VaultError> {
        let conn = self
            .dal
            .database
            .pool()
            .get()
            .await
            .map_err(|e| VaultError::ConnectionPool(e.to_string()))?;

        let id_blob = uuid_to_blob(&id);
        conn.interact(move |conn| {
            diesel::delete(notifications::table.filter(notifications::id.eq(id_blob)))
                .execute(conn)
        })
        .await
        .map_err(|e| VaultError::ConnectionPool(e.to_string()))??;

        Ok(())
    }
}

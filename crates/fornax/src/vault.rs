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

//! The vault coordinator.
//!
//! `Vault` is the public façade over the bundle store, the artifact
//! cache, the cooker directory, the task submitter and the mailer. It
//! owns the lifecycle rules:
//!
//! - **Request coalescing**: a bundle row in any state other than
//!   `failed` means a cook is already in flight or complete; no second
//!   task is submitted for the pair. The unique
//!   (object_type, object_id) index makes this hold across concurrent
//!   coordinators sharing one store.
//! - **Failure retry**: the only way to re-cook a failed bundle is to
//!   delete its row and start over with a fresh task.
//! - **Notification decoupling**: terminal transitions commit before
//!   any mail is attempted; subscriptions survive failed sends and are
//!   retried on the next dispatch.
//! - **Eviction**: non-sticky bundles only, ordered on a configurable
//!   timestamp axis, with row and cache deletion coupled.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{BundleCache, FilesystemBundleCache};
use crate::config::{NotificationConfig, VaultConfig};
use crate::cookers::CookerRegistry;
use crate::dal::DAL;
use crate::database::Database;
use crate::error::VaultError;
use crate::models::batch::BatchStatus;
use crate::models::bundle::{Bundle, BundleStatus, ExpireBy, NewBundle, ProgressInfo};
use crate::models::object_id::ObjectId;
use crate::notify::{self, Mailer, SmtpMailer};
use crate::scheduler::{TaskSubmitter, BATCH_COOKING_TASK_NAME, COOKING_TASK_NAME};

/// Per-request options for [`Vault::cook`].
#[derive(Debug, Clone, Default)]
pub struct CookOptions {
    /// Exempt the bundle from automatic cache eviction.
    pub sticky: bool,
    /// Notify this address when the bundle reaches a terminal state
    /// (or immediately, if it is already done).
    pub email: Option<String>,
}

/// The bundle-cooking coordinator.
#[derive(Clone)]
pub struct Vault {
    dal: DAL,
    cache: Arc<dyn BundleCache>,
    cookers: Arc<CookerRegistry>,
    submitter: Arc<dyn TaskSubmitter>,
    mailer: Arc<dyn Mailer>,
    notifications: NotificationConfig,
}

impl Vault {
    /// Assembles a vault from its collaborators.
    pub fn new(
        database: Database,
        cache: Arc<dyn BundleCache>,
        cookers: Arc<CookerRegistry>,
        submitter: Arc<dyn TaskSubmitter>,
        mailer: Arc<dyn Mailer>,
        notifications: NotificationConfig,
    ) -> Self {
        Self {
            dal: DAL::new(database),
            cache,
            cookers,
            submitter,
            mailer,
            notifications,
        }
    }

    /// Opens a vault from configuration: connects and migrates the
    /// database, prepares the filesystem cache and the SMTP mailer.
    ///
    /// Cookers and the task submitter stay injected; they belong to the
    /// deployment, not the configuration file.
    pub async fn open(
        config: &VaultConfig,
        cookers: Arc<CookerRegistry>,
        submitter: Arc<dyn TaskSubmitter>,
    ) -> Result<Self, VaultError> {
        let database = Database::new(&config.database.url);
        database.run_migrations().await?;

        let cache = Arc::new(FilesystemBundleCache::new(config.cache.path.clone())?);
        let mailer = Arc::new(SmtpMailer::new(
            &config.smtp.host,
            config.smtp.port,
            &config.notifications.from_address,
        )?);

        Ok(Self::new(
            database,
            cache,
            cookers,
            submitter,
            mailer,
            config.notifications.clone(),
        ))
    }

    /// Requests the cooking of one bundle.
    ///
    /// If no bundle row exists (or only a failed one), the cooker's
    /// existence check gates the creation of a fresh row and one task
    /// submission. An existing row in `new`, `pending` or `done`
    /// coalesces: the caller joins the in-flight (or finished) cook and
    /// no task is submitted.
    ///
    /// With `email` set, a success notification goes out immediately if
    /// the bundle is already done; otherwise a subscription is recorded
    /// for the terminal transition.
    pub async fn cook(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        options: CookOptions,
    ) -> Result<ProgressInfo, VaultError> {
        if !self.cookers.contains(object_type) {
            return Err(VaultError::UnknownType(object_type.to_string()));
        }

        let bundles = self.dal.bundles();
        let mut existing = bundles.get(object_type, object_id).await?;

        // A failed bundle can only be re-cooked from scratch.
        if existing.as_ref().map(|b| b.status) == Some(BundleStatus::Failed) {
            bundles.delete_if_failed(object_type, object_id).await?;
            existing = None;
        }

        let was_done = existing.as_ref().map(|b| b.status) == Some(BundleStatus::Done);

        let bundle = match existing {
            Some(bundle) => bundle,
            None => {
                let cooker = self
                    .cookers
                    .get(object_type)
                    .ok_or_else(|| VaultError::UnknownType(object_type.to_string()))?;
                if !cooker.check_exists(object_id).await? {
                    return Err(VaultError::NotFound(format!(
                        "{} {} was not found",
                        object_type,
                        object_id.to_hex()
                    )));
                }

                bundles
                    .create_if_absent(&NewBundle {
                        object_type: object_type.to_string(),
                        object_id: object_id.clone(),
                        sticky: options.sticky,
                    })
                    .await?
            }
        };

        // No task id means the task was never submitted, either because
        // the row is brand new or because an earlier submission failed.
        if bundle.task_id.is_none() {
            let task_id = self
                .submitter
                .submit(COOKING_TASK_NAME, object_type, &object_id.to_hex())
                .await?;
            bundles
                .record_task_id(object_type, object_id, &task_id)
                .await?;
            debug!(object_type, object_id = %object_id, task_id, "submitted cooking task");
        }

        if let Some(email) = &options.email {
            if was_done {
                if let Err(e) = self
                    .dispatch_email(
                        email,
                        object_type,
                        object_id,
                        BundleStatus::Done,
                        bundle.progress_msg.as_deref(),
                    )
                    .await
                {
                    warn!(object_type, object_id = %object_id, error = %e,
                          "immediate notification failed");
                }
            } else {
                self.dal.notifications().add(bundle.id, email).await?;
            }
        }

        self.require_progress(object_type, object_id).await
    }

    /// Reads the progress record of a bundle.
    pub async fn progress(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        raise_if_absent: bool,
    ) -> Result<Option<ProgressInfo>, VaultError> {
        match self.dal.bundles().get(object_type, object_id).await? {
            Some(bundle) => Ok(Some(bundle.into())),
            None if raise_if_absent => Err(VaultError::NotFound(format!(
                "{} {} was not found",
                object_type,
                object_id.to_hex()
            ))),
            None => Ok(None),
        }
    }

    /// Requests the cooking of a set of bundles and returns the batch
    /// id for later aggregate progress queries.
    ///
    /// Member rows join existing in-flight cooks exactly like single
    /// requests do; one task is submitted per member that has no task
    /// id yet, in list form.
    pub async fn batch_cook(&self, batch: &[(String, ObjectId)]) -> Result<Uuid, VaultError> {
        for (object_type, _) in batch {
            if !self.cookers.contains(object_type) {
                return Err(VaultError::UnknownType(object_type.clone()));
            }
        }

        let batch_id = self.dal.batches().create_with_members(batch.to_vec()).await?;

        let members = self
            .dal
            .batches()
            .members(batch_id)
            .await?
            .unwrap_or_default();
        let to_submit: Vec<&Bundle> =
            members.iter().filter(|b| b.task_id.is_none()).collect();

        if !to_submit.is_empty() {
            let requests: Vec<(String, String)> = to_submit
                .iter()
                .map(|b| (b.object_type.clone(), b.object_id.to_hex()))
                .collect();
            let task_ids = self
                .submitter
                .submit_batch(BATCH_COOKING_TASK_NAME, &requests)
                .await?;
            for (bundle, task_id) in to_submit.iter().zip(task_ids) {
                self.dal
                    .bundles()
                    .record_task_id(&bundle.object_type, &bundle.object_id, &task_id)
                    .await?;
            }
            debug!(batch_id = %batch_id, tasks = requests.len(), "submitted batch cooking tasks");
        }

        Ok(batch_id)
    }

    /// Reports aggregate progress for a batch.
    pub async fn batch_progress(&self, batch_id: Uuid) -> Result<BatchStatus, VaultError> {
        let members = self
            .dal
            .batches()
            .members(batch_id)
            .await?
            .ok_or_else(|| {
                VaultError::NotFound(format!("batch {} does not exist", batch_id))
            })?;
        Ok(BatchStatus::from_bundles(
            members.into_iter().map(Into::into).collect(),
        ))
    }

    /// Whether a bundle is done and its artifact is present in the
    /// cache.
    pub async fn is_available(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<bool, VaultError> {
        match self.dal.bundles().get(object_type, object_id).await? {
            Some(bundle) if bundle.status == BundleStatus::Done => {
                Ok(self.cache.has(object_type, object_id).await?)
            }
            _ => Ok(false),
        }
    }

    /// Retrieves a cooked bundle artifact.
    ///
    /// A successful fetch stamps `ts_last_access`, feeding the
    /// last-access eviction axis.
    pub async fn fetch(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        raise_if_absent: bool,
    ) -> Result<Option<Vec<u8>>, VaultError> {
        if !self.is_available(object_type, object_id).await? {
            if raise_if_absent {
                return Err(VaultError::NotFound(format!(
                    "{} {} is not available",
                    object_type,
                    object_id.to_hex()
                )));
            }
            return Ok(None);
        }

        self.dal.bundles().touch(object_type, object_id).await?;
        Ok(self.cache.get(object_type, object_id).await?)
    }

    /// Stores a produced artifact in the cache.
    ///
    /// Called by cooker workers. This never advances the bundle status;
    /// the worker transitions the bundle separately through
    /// [`Vault::set_status`], so the artifact stays unobservable until
    /// then.
    pub async fn put_bundle(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        data: Vec<u8>,
    ) -> Result<(), VaultError> {
        self.cache.put(object_type, object_id, data).await?;
        Ok(())
    }

    /// Worker-facing status transition.
    ///
    /// Transitioning to `done` stamps `ts_done`. On a terminal
    /// transition the update commits first, then pending notifications
    /// are dispatched best-effort: mail problems are logged and never
    /// undo or mask the transition.
    pub async fn set_status(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        status: BundleStatus,
    ) -> Result<(), VaultError> {
        let updated = self
            .dal
            .bundles()
            .set_status(object_type, object_id, status)
            .await?;

        if updated && status.is_terminal() {
            if let Err(e) = self.send_pending_notifications(object_type, object_id).await {
                warn!(object_type, object_id = %object_id, error = %e,
                      "post-transition notification dispatch failed");
            }
        }
        Ok(())
    }

    /// Worker-facing progress message update.
    pub async fn set_progress(
        &self,
        object_type: &str,
        object_id: &ObjectId,
        progress: &str,
    ) -> Result<(), VaultError> {
        self.dal
            .bundles()
            .set_progress(object_type, object_id, progress)
            .await?;
        Ok(())
    }

    /// Dispatches one email per pending subscription of a terminal
    /// bundle.
    ///
    /// Every successful send deletes its subscription row; failed sends
    /// keep theirs for a later retry. Calling this on a non-terminal
    /// bundle is a precondition error.
    pub async fn send_pending_notifications(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<(), VaultError> {
        let bundle = self
            .dal
            .bundles()
            .get(object_type, object_id)
            .await?
            .ok_or_else(|| {
                VaultError::NotFound(format!(
                    "{} {} was not found",
                    object_type,
                    object_id.to_hex()
                ))
            })?;

        if !bundle.status.is_terminal() {
            return Err(VaultError::Precondition(format!(
                "cannot send notifications for {} {} in status {}",
                object_type,
                object_id.to_hex(),
                bundle.status
            )));
        }

        for subscription in self.dal.notifications().for_bundle(bundle.id).await? {
            match self
                .dispatch_email(
                    &subscription.email,
                    object_type,
                    object_id,
                    bundle.status,
                    bundle.progress_msg.as_deref(),
                )
                .await
            {
                Ok(()) => self.dal.notifications().delete(subscription.id).await?,
                Err(e) => {
                    warn!(email = %subscription.email, error = %e,
                          "notification send failed; keeping subscription for retry");
                }
            }
        }
        Ok(())
    }

    /// Evicts the `n` oldest non-sticky bundles on the given timestamp
    /// axis, removing both the bundle row and the cached artifact.
    ///
    /// Returns the evicted (object_type, hex id) pairs.
    pub async fn cache_expire_oldest(
        &self,
        n: u64,
        by: ExpireBy,
    ) -> Result<Vec<(String, String)>, VaultError> {
        let evicted = self.dal.bundles().evict_oldest(by, n as i64).await?;
        self.drop_cached(evicted).await
    }

    /// Evicts every non-sticky bundle whose timestamp on the given axis
    /// is at or before `cutoff`.
    ///
    /// Returns the evicted (object_type, hex id) pairs.
    pub async fn cache_expire_until(
        &self,
        cutoff: DateTime<Utc>,
        by: ExpireBy,
    ) -> Result<Vec<(String, String)>, VaultError> {
        let evicted = self.dal.bundles().evict_until(by, cutoff).await?;
        self.drop_cached(evicted).await
    }

    async fn drop_cached(
        &self,
        evicted: Vec<Bundle>,
    ) -> Result<Vec<(String, String)>, VaultError> {
        let mut reported = Vec::with_capacity(evicted.len());
        for bundle in evicted {
            self.cache
                .delete(&bundle.object_type, &bundle.object_id)
                .await?;
            reported.push((bundle.object_type, bundle.object_id.to_hex()));
        }
        Ok(reported)
    }

    async fn dispatch_email(
        &self,
        to: &str,
        object_type: &str,
        object_id: &ObjectId,
        status: BundleStatus,
        progress_msg: Option<&str>,
    ) -> Result<(), VaultError> {
        let hex_id = object_id.to_hex();
        let message = match status {
            BundleStatus::Done => notify::success_message(
                to,
                object_type,
                &hex_id,
                &self.notifications.download_url_base,
            ),
            BundleStatus::Failed => {
                notify::failure_message(to, object_type, &hex_id, progress_msg)
            }
            other => {
                return Err(VaultError::Precondition(format!(
                    "cannot notify for a bundle in status {}",
                    other
                )))
            }
        };

        self.mailer.send(&message).await?;
        Ok(())
    }

    async fn require_progress(
        &self,
        object_type: &str,
        object_id: &ObjectId,
    ) -> Result<ProgressInfo, VaultError> {
        self.progress(object_type, object_id, true)
            .await?
            .ok_or_else(|| {
                VaultError::NotFound(format!(
                    "{} {} was not found",
                    object_type,
                    object_id.to_hex()
                ))
            })
    }
}

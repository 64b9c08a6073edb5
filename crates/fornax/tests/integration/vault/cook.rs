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

//! Single-bundle cook lifecycle tests: creation, coalescing, failure
//! retry and submission retry.

use fornax::{BundleStatus, CookOptions, VaultError};

use crate::fixtures::{object_id, vault_fixture};

#[tokio::test]
async fn create_then_complete() {
    let f = vault_fixture().await;
    let id = object_id("aa");

    let progress = f
        .vault
        .cook("directory", &id, CookOptions::default())
        .await
        .expect("cook failed");
    assert_eq!(progress.status, BundleStatus::New);
    assert_eq!(progress.task_id.as_deref(), Some("task-1"));
    assert_eq!(progress.object_id, "aa".repeat(20));
    assert!(progress.ts_done.is_none());

    // The worker reports progress, stores the artifact and finishes.
    f.vault
        .set_progress("directory", &id, "50%")
        .await
        .unwrap();
    f.vault
        .put_bundle("directory", &id, b"X".to_vec())
        .await
        .unwrap();
    f.vault
        .set_status("directory", &id, BundleStatus::Done)
        .await
        .unwrap();

    assert!(f.vault.is_available("directory", &id).await.unwrap());
    let data = f.vault.fetch("directory", &id, true).await.unwrap();
    assert_eq!(data, Some(b"X".to_vec()));

    let progress = f
        .vault
        .progress("directory", &id, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.status, BundleStatus::Done);
    assert_eq!(progress.progress_msg.as_deref(), Some("50%"));
    assert!(progress.ts_done.is_some());
}

#[tokio::test]
async fn repeated_cook_submits_no_second_task() {
    let f = vault_fixture().await;
    let id = object_id("bb");

    let first = f
        .vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();
    let second = f
        .vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();

    assert_eq!(first.task_id, second.task_id);
    assert_eq!(first.status, second.status);
    assert_eq!(f.submitter.submissions().len(), 1);
}

#[tokio::test]
async fn failed_bundle_is_recreated_with_a_fresh_task() {
    let f = vault_fixture().await;
    let id = object_id("cc");

    let first = f
        .vault
        .cook("revision_gitfast", &id, CookOptions::default())
        .await
        .unwrap();
    f.vault
        .set_status("revision_gitfast", &id, BundleStatus::Failed)
        .await
        .unwrap();

    // Dispatching with no subscriptions is a no-op.
    f.vault
        .send_pending_notifications("revision_gitfast", &id)
        .await
        .unwrap();

    let second = f
        .vault
        .cook("revision_gitfast", &id, CookOptions::default())
        .await
        .unwrap();
    assert_eq!(second.status, BundleStatus::New);
    assert_ne!(first.task_id, second.task_id);
    assert_eq!(f.submitter.submissions().len(), 2);
}

#[tokio::test]
async fn unknown_type_is_rejected() {
    let f = vault_fixture().await;
    let id = object_id("aa");

    let err = f
        .vault
        .cook("snapshot", &id, CookOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::UnknownType(_)));
}

#[tokio::test]
async fn missing_archive_object_is_rejected() {
    let f = vault_fixture().await;
    let id = object_id("ab");

    f.cooker.set_missing(true);
    let err = f
        .vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));

    // No row and no task may exist after a rejected request.
    assert!(f
        .vault
        .progress("directory", &id, false)
        .await
        .unwrap()
        .is_none());
    assert!(f.submitter.submissions().is_empty());
}

#[tokio::test]
async fn submission_failure_leaves_a_retryable_row() {
    let f = vault_fixture().await;
    let id = object_id("ad");

    f.submitter.set_fail(true);
    let err = f
        .vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Scheduler(_)));

    // The row was created but carries no task id.
    let progress = f
        .vault
        .progress("directory", &id, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.status, BundleStatus::New);
    assert!(progress.task_id.is_none());

    // The next cook retries the submission on the same row.
    f.submitter.set_fail(false);
    let progress = f
        .vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();
    assert!(progress.task_id.is_some());
    assert_eq!(f.submitter.submissions().len(), 1);
}

#[tokio::test]
async fn progress_honors_the_absence_flag() {
    let f = vault_fixture().await;
    let id = object_id("ae");

    assert!(f
        .vault
        .progress("directory", &id, false)
        .await
        .unwrap()
        .is_none());

    let err = f.vault.progress("directory", &id, true).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));
}

#[tokio::test]
async fn fetch_honors_the_absence_flag() {
    let f = vault_fixture().await;
    let id = object_id("af");

    assert_eq!(f.vault.fetch("directory", &id, false).await.unwrap(), None);

    let err = f.vault.fetch("directory", &id, true).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));
}

#[tokio::test]
async fn cached_artifact_stays_invisible_until_done() {
    let f = vault_fixture().await;
    let id = object_id("ba");

    f.vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();
    f.vault
        .put_bundle("directory", &id, b"early".to_vec())
        .await
        .unwrap();

    // Payload present, but the bundle has not been transitioned.
    assert!(!f.vault.is_available("directory", &id).await.unwrap());
    assert_eq!(f.vault.fetch("directory", &id, false).await.unwrap(), None);

    f.vault
        .set_status("directory", &id, BundleStatus::Done)
        .await
        .unwrap();
    assert!(f.vault.is_available("directory", &id).await.unwrap());
}

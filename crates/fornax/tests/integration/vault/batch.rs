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

//! Batch cooking tests: member dedup, coalescing with single requests
//! and aggregate progress counters.

use fornax::{BundleStatus, CookOptions, VaultError};
use uuid::Uuid;

use crate::fixtures::{object_id, vault_fixture};

#[tokio::test]
async fn duplicate_members_collapse_and_two_tasks_go_out() {
    let f = vault_fixture().await;
    let dd = object_id("dd");
    let ee = object_id("ee");

    let batch_id = f
        .vault
        .batch_cook(&[
            ("directory".to_string(), dd.clone()),
            ("directory".to_string(), ee.clone()),
            ("directory".to_string(), dd.clone()),
        ])
        .await
        .expect("batch_cook failed");

    assert_eq!(f.submitter.submissions().len(), 2);

    let status = f.vault.batch_progress(batch_id).await.unwrap();
    assert_eq!(status.total, 2);
    assert_eq!(status.new, 2);

    // Membership order follows the request order.
    assert_eq!(status.bundles[0].object_id, dd.to_hex());
    assert_eq!(status.bundles[1].object_id, ee.to_hex());

    // One bundle finishes, the other gets picked up.
    f.vault
        .put_bundle("directory", &dd, b"tarball".to_vec())
        .await
        .unwrap();
    f.vault
        .set_status("directory", &dd, BundleStatus::Done)
        .await
        .unwrap();
    f.vault
        .set_status("directory", &ee, BundleStatus::Pending)
        .await
        .unwrap();

    let status = f.vault.batch_progress(batch_id).await.unwrap();
    assert_eq!(status.total, 2);
    assert_eq!(status.done, 1);
    assert_eq!(status.pending, 1);
    assert_eq!(status.new, 0);
    assert_eq!(status.failed, 0);
}

#[tokio::test]
async fn batch_joins_an_in_flight_single_cook() {
    let f = vault_fixture().await;
    let dd = object_id("da");
    let ee = object_id("eb");

    f.vault
        .cook("directory", &dd, CookOptions::default())
        .await
        .unwrap();
    assert_eq!(f.submitter.submissions().len(), 1);

    let batch_id = f
        .vault
        .batch_cook(&[
            ("directory".to_string(), dd.clone()),
            ("directory".to_string(), ee.clone()),
        ])
        .await
        .unwrap();

    // Only the genuinely new member got a task.
    assert_eq!(f.submitter.submissions().len(), 2);

    let status = f.vault.batch_progress(batch_id).await.unwrap();
    assert_eq!(status.total, 2);
    assert!(status.bundles.iter().all(|b| b.task_id.is_some()));
}

#[tokio::test]
async fn failed_members_are_recreated() {
    let f = vault_fixture().await;
    let id = object_id("dc");

    f.vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();
    f.vault
        .set_status("directory", &id, BundleStatus::Failed)
        .await
        .unwrap();

    let batch_id = f
        .vault
        .batch_cook(&[("directory".to_string(), id.clone())])
        .await
        .unwrap();

    let status = f.vault.batch_progress(batch_id).await.unwrap();
    assert_eq!(status.total, 1);
    assert_eq!(status.new, 1);
    // Retry means a second task for the recreated bundle.
    assert_eq!(f.submitter.submissions().len(), 2);
}

#[tokio::test]
async fn unknown_member_type_fails_the_whole_batch() {
    let f = vault_fixture().await;

    let err = f
        .vault
        .batch_cook(&[
            ("directory".to_string(), object_id("dd")),
            ("snapshot".to_string(), object_id("ee")),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::UnknownType(_)));

    // Nothing was recorded or submitted.
    assert!(f.submitter.submissions().is_empty());
}

#[tokio::test]
async fn unknown_batch_is_not_found() {
    let f = vault_fixture().await;

    let err = f.vault.batch_progress(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));
}

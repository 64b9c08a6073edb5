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

//! Email notification tests: subscriptions, immediate dispatch,
//! at-most-once delivery and retry after transport outages.

use fornax::{BundleStatus, CookOptions, VaultError};

use crate::fixtures::{object_id, vault_fixture};

fn with_email(email: &str) -> CookOptions {
    CookOptions {
        email: Some(email.to_string()),
        ..CookOptions::default()
    }
}

#[tokio::test]
async fn coalesced_cook_records_one_subscription_and_one_email_goes_out() {
    let f = vault_fixture().await;
    let id = object_id("bb");

    f.vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();
    f.vault
        .cook("directory", &id, with_email("u@x"))
        .await
        .unwrap();

    // The second request joined the first cook.
    assert_eq!(f.submitter.submissions().len(), 1);
    assert!(f.mailer.sent().is_empty());

    f.vault
        .set_status("directory", &id, BundleStatus::Done)
        .await
        .unwrap();
    f.vault
        .send_pending_notifications("directory", &id)
        .await
        .unwrap();

    let sent = f.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "u@x");
    assert_eq!(sent[0].subject, "Bundle ready: directory bbbbbbb");
    assert!(sent[0]
        .body
        .contains(&format!(
            "https://vault.example.org/api/1/vault/directory/{}/raw",
            "bb".repeat(20)
        )));
}

#[tokio::test]
async fn already_done_bundle_is_notified_immediately() {
    let f = vault_fixture().await;
    let id = object_id("ff");

    f.vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();
    f.vault
        .put_bundle("directory", &id, b"payload".to_vec())
        .await
        .unwrap();
    f.vault
        .set_status("directory", &id, BundleStatus::Done)
        .await
        .unwrap();

    f.vault
        .cook("directory", &id, with_email("u@x"))
        .await
        .unwrap();

    let sent = f.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Bundle ready: directory fffffff");

    // No subscription row lingers: a later dispatch sends nothing new.
    f.vault
        .send_pending_notifications("directory", &id)
        .await
        .unwrap();
    assert_eq!(f.mailer.sent().len(), 1);
}

#[tokio::test]
async fn failure_notification_carries_the_progress_message() {
    let f = vault_fixture().await;
    let id = object_id("cc");

    f.vault
        .cook("revision_gitfast", &id, with_email("u@x"))
        .await
        .unwrap();
    f.vault
        .set_progress("revision_gitfast", &id, "corrupt revision graph")
        .await
        .unwrap();
    f.vault
        .set_status("revision_gitfast", &id, BundleStatus::Failed)
        .await
        .unwrap();

    let sent = f.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Bundle failed: revision_gitfast ccccccc");
    assert!(sent[0].body.contains("corrupt revision graph"));
}

#[tokio::test]
async fn failed_send_keeps_the_subscription_for_retry() {
    let f = vault_fixture().await;
    let id = object_id("ca");

    f.vault
        .cook("directory", &id, with_email("u@x"))
        .await
        .unwrap();

    // The transition itself must survive the mail outage.
    f.mailer.set_fail(true);
    f.vault
        .set_status("directory", &id, BundleStatus::Done)
        .await
        .unwrap();
    assert!(f.mailer.sent().is_empty());
    let progress = f
        .vault
        .progress("directory", &id, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.status, BundleStatus::Done);

    // Once the transport recovers, the pending subscription drains.
    f.mailer.set_fail(false);
    f.vault
        .send_pending_notifications("directory", &id)
        .await
        .unwrap();
    assert_eq!(f.mailer.sent().len(), 1);

    // Exactly once: the subscription is gone after the send.
    f.vault
        .send_pending_notifications("directory", &id)
        .await
        .unwrap();
    assert_eq!(f.mailer.sent().len(), 1);
}

#[tokio::test]
async fn non_terminal_bundle_rejects_dispatch() {
    let f = vault_fixture().await;
    let id = object_id("cb");

    f.vault
        .cook("directory", &id, CookOptions::default())
        .await
        .unwrap();

    let err = f
        .vault
        .send_pending_notifications("directory", &id)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::Precondition(_)));
}

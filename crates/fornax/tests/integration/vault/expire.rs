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

//! Cache eviction tests: ordering, sticky exemption and the fetch
//! hot-touch.

use fornax::models::object_id::ObjectId;
use fornax::{BundleCache, BundleStatus, CookOptions, ExpireBy, VaultError};

use crate::fixtures::{object_id, vault_fixture, TestVault};

/// Cooks a bundle to completion with the given payload.
async fn cooked_bundle(f: &TestVault, id: &ObjectId, sticky: bool) {
    f.vault
        .cook(
            "directory",
            id,
            CookOptions {
                sticky,
                ..CookOptions::default()
            },
        )
        .await
        .unwrap();
    f.vault
        .put_bundle("directory", id, id.to_hex().into_bytes())
        .await
        .unwrap();
    f.vault
        .set_status("directory", id, BundleStatus::Done)
        .await
        .unwrap();
}

#[tokio::test]
async fn oldest_by_last_access_evicts_rows_and_artifacts() {
    let f = vault_fixture().await;
    let (a, b, c) = (object_id("aa"), object_id("bb"), object_id("cc"));

    for id in [&a, &b, &c] {
        cooked_bundle(&f, id, false).await;
    }
    // Establish a strict last-access order: a < b < c.
    for id in [&a, &b, &c] {
        f.vault.fetch("directory", id, true).await.unwrap();
    }

    let evicted = f
        .vault
        .cache_expire_oldest(2, ExpireBy::LastAccess)
        .await
        .unwrap();
    assert_eq!(evicted.len(), 2);
    assert_eq!(evicted[0].1, a.to_hex());
    assert_eq!(evicted[1].1, b.to_hex());

    // Both the row and the artifact are gone.
    let err = f.vault.fetch("directory", &a, true).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound(_)));
    assert!(f
        .vault
        .progress("directory", &b, false)
        .await
        .unwrap()
        .is_none());
    assert!(!f.cache.has("directory", &a).await.unwrap());

    // The survivor is untouched.
    assert!(f.vault.is_available("directory", &c).await.unwrap());
}

#[tokio::test]
async fn sticky_bundles_are_never_evicted() {
    let f = vault_fixture().await;
    let plain = object_id("ab");
    let pinned = object_id("ba");

    cooked_bundle(&f, &plain, false).await;
    cooked_bundle(&f, &pinned, true).await;

    let evicted = f
        .vault
        .cache_expire_oldest(10, ExpireBy::Created)
        .await
        .unwrap();
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].1, plain.to_hex());

    assert!(f.vault.is_available("directory", &pinned).await.unwrap());
}

#[tokio::test]
async fn expire_until_cuts_at_the_given_timestamp() {
    let f = vault_fixture().await;
    let (a, b, c) = (object_id("da"), object_id("db"), object_id("dc"));

    for id in [&a, &b, &c] {
        cooked_bundle(&f, id, false).await;
        f.vault.fetch("directory", id, true).await.unwrap();
    }

    let cutoff = f
        .vault
        .progress("directory", &b, true)
        .await
        .unwrap()
        .unwrap()
        .ts_last_access;

    let evicted = f
        .vault
        .cache_expire_until(cutoff, ExpireBy::LastAccess)
        .await
        .unwrap();
    let evicted_ids: Vec<&str> = evicted.iter().map(|(_, hex)| hex.as_str()).collect();
    assert_eq!(evicted_ids, vec![a.to_hex(), b.to_hex()]);

    assert!(f.vault.is_available("directory", &c).await.unwrap());
}

#[tokio::test]
async fn fetch_advances_the_last_access_timestamp() {
    let f = vault_fixture().await;
    let id = object_id("ea");

    cooked_bundle(&f, &id, false).await;
    let before = f
        .vault
        .progress("directory", &id, true)
        .await
        .unwrap()
        .unwrap()
        .ts_last_access;

    f.vault.fetch("directory", &id, true).await.unwrap();

    let after = f
        .vault
        .progress("directory", &id, true)
        .await
        .unwrap()
        .unwrap()
        .ts_last_access;
    assert!(after > before);
}

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

//! Diesel schema for the vault tables.
//!
//! SQLite storage conventions: UUIDs as BLOB, timestamps as RFC3339
//! TEXT, booleans as INTEGER. The unique index on
//! (object_type, object_id) is what serializes concurrent cook requests
//! for the same pair.

diesel::table! {
    bundles (id) {
        id -> Binary,
        object_type -> Text,
        object_id -> Binary,
        task_id -> Nullable<Text>,
        task_status -> Text,
        sticky -> Integer,
        ts_created -> Text,
        ts_done -> Nullable<Text>,
        ts_last_access -> Text,
        progress_msg -> Nullable<Text>,
    }
}

diesel::table! {
    batches (id) {
        id -> Binary,
        created_at -> Text,
    }
}

diesel::table! {
    batch_memberships (batch_id, bundle_id) {
        batch_id -> Binary,
        bundle_id -> Binary,
        position -> Integer,
    }
}

diesel::table! {
    notifications (id) {
        id -> Binary,
        bundle_id -> Binary,
        email -> Text,
        created_at -> Text,
    }
}

diesel::joinable!(batch_memberships -> batches (batch_id));
diesel::joinable!(batch_memberships -> bundles (bundle_id));
diesel::joinable!(notifications -> bundles (bundle_id));

diesel::allow_tables_to_appear_in_same_query!(bundles, batches, batch_memberships, notifications);

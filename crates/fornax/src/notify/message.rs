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

//! Notification message rendering.
//!
//! Subjects and plain-text bodies for the two terminal outcomes. The
//! download URL format (`<root>/api/1/vault/<type>/<hex>/raw`) is part
//! of the external contract and must stay stable.

/// A rendered, ready-to-send notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Renders the "bundle ready" notification.
pub fn success_message(
    to: &str,
    object_type: &str,
    hex_id: &str,
    download_url_base: &str,
) -> EmailMessage {
    let url = download_url(download_url_base, object_type, hex_id);
    let body = format!(
        "You have requested the following bundle from the Fornax Vault:\n\
         \n\
         Object Type: {object_type}\n\
         Object ID: {hex_id}\n\
         \n\
         This bundle is now available for download at the following address:\n\
         \n\
         {url}\n\
         \n\
         Please keep in mind that this link might expire at some point, in\n\
         which case you will need to request the bundle again.\n\
         \n\
         -- \n\
         The Fornax Developers"
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Bundle ready: {} {}", object_type, short_id(hex_id)),
        body,
    }
}

/// Renders the "bundle failed" notification.
pub fn failure_message(
    to: &str,
    object_type: &str,
    hex_id: &str,
    progress_msg: Option<&str>,
) -> EmailMessage {
    let reason = progress_msg.unwrap_or("Unknown error");
    let body = format!(
        "You have requested the following bundle from the Fornax Vault:\n\
         \n\
         Object Type: {object_type}\n\
         Object ID: {hex_id}\n\
         \n\
         This bundle could not be cooked for the following reason:\n\
         \n\
         {reason}\n\
         \n\
         We apologize for the inconvenience.\n\
         \n\
         -- \n\
         The Fornax Developers"
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Bundle failed: {} {}", object_type, short_id(hex_id)),
        body,
    }
}

/// Builds the raw-download URL for a bundle.
pub fn download_url(base: &str, object_type: &str, hex_id: &str) -> String {
    format!(
        "{}/api/1/vault/{}/{}/raw",
        base.trim_end_matches('/'),
        object_type,
        hex_id
    )
}

fn short_id(hex_id: &str) -> &str {
    &hex_id[..hex_id.len().min(7)]
}

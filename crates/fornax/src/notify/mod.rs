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

//! Outbound mail.
//!
//! The `Mailer` trait dispatches pre-rendered messages; `SmtpMailer` is
//! the production implementation over lettre's SMTP transport. The
//! transport is a stateful connection and is not assumed thread-safe:
//! sends are serialized behind a mutex, and a failed connection probe
//! rebuilds the transport before the next send.

pub mod message;

pub use message::{failure_message, success_message, EmailMessage};

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while dispatching a notification email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid mail address: {0}")]
    Address(String),

    /// The RFC 5322 message could not be assembled.
    #[error("could not build message: {0}")]
    Build(String),

    /// SMTP-level failure.
    #[error("smtp error: {0}")]
    Smtp(String),
}

/// Dispatches pre-rendered notification messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message. Implementations must be safe to call from
    /// concurrent tasks; the vault relies on them to serialize access
    /// to any underlying connection.
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

/// SMTP mailer over a pooled lettre transport.
pub struct SmtpMailer {
    host: String,
    port: u16,
    from: Mailbox,
    transport: Arc<Mutex<SmtpTransport>>,
}

impl SmtpMailer {
    /// Creates a mailer talking plain SMTP to `host:port`, sending as
    /// `from_address` (e.g. `"Fornax Vault" <bot@example.org>`).
    pub fn new(host: &str, port: u16, from_address: &str) -> Result<Self, MailerError> {
        let from: Mailbox = from_address
            .parse()
            .map_err(|e| MailerError::Address(format!("{}: {}", from_address, e)))?;
        let transport = SmtpTransport::builder_dangerous(host).port(port).build();

        Ok(Self {
            host: host.to_string(),
            port,
            from,
            transport: Arc::new(Mutex::new(transport)),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailerError::Address(format!("{}: {}", message.to, e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| MailerError::Build(e.to_string()))?;

        let transport = self.transport.clone();
        let host = self.host.clone();
        let port = self.port;
        let subject = message.subject.clone();

        // The transport blocks on the wire; hand it to the blocking
        // pool and serialize sends under the mutex.
        tokio::task::spawn_blocking(move || {
            let mut guard = transport.lock();

            // A failed probe means the pooled connection went away;
            // rebuild the transport before sending.
            if !guard.test_connection().unwrap_or(false) {
                *guard = SmtpTransport::builder_dangerous(&host).port(port).build();
            }

            guard
                .send(&email)
                .map(|_| ())
                .map_err(|e| MailerError::Smtp(e.to_string()))?;
            debug!(subject, "notification email sent");
            Ok(())
        })
        .await
        .map_err(|e| MailerError::Smtp(format!("send task panicked: {}", e)))?
    }
}

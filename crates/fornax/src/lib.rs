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

//! # Fornax
//!
//! A bundle-cooking vault backend. Clients request archive "bundles" by
//! (object_type, object_id); fornax schedules opaque cooker tasks,
//! tracks their lifecycle in SQLite, caches produced artifacts on the
//! filesystem, notifies subscribers by email on terminal transitions
//! and enforces a sticky-aware cache eviction policy.
//!
//! ## Architecture
//!
//! - [`vault::Vault`]: the coordinator façade and its lifecycle rules
//! - [`dal`]: data access layer over the bundle, batch and notification
//!   tables
//! - [`cache`]: content-addressed artifact storage
//! - [`cookers`]: the directory of known object types
//! - [`scheduler`]: the task submission seam
//! - [`notify`]: notification rendering and SMTP dispatch
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fornax::{CookerRegistry, Vault, VaultConfig};
//!
//! # async fn example(
//! #     my_cooker: Arc<dyn fornax::Cooker>,
//! #     my_submitter: Arc<dyn fornax::TaskSubmitter>,
//! # ) -> Result<(), fornax::VaultError> {
//! let cookers = Arc::new(CookerRegistry::new());
//! cookers.register("directory", my_cooker);
//!
//! let config = VaultConfig::default();
//! let vault = Vault::open(&config, cookers, my_submitter).await?;
//!
//! let object_id = fornax::ObjectId::from_hex(&"aa".repeat(20)).unwrap();
//! let progress = vault.cook("directory", &object_id, Default::default()).await?;
//! println!("bundle is {}", progress.status);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod cookers;
pub mod dal;
pub mod database;
pub mod error;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod vault;

pub use cache::{BundleCache, CacheError, FilesystemBundleCache};
pub use config::{ConfigError, VaultConfig};
pub use cookers::{Cooker, CookerRegistry};
pub use dal::DAL;
pub use database::Database;
pub use error::VaultError;
pub use models::{BatchStatus, Bundle, BundleStatus, ExpireBy, ObjectId, ProgressInfo};
pub use notify::{EmailMessage, Mailer, MailerError, SmtpMailer};
pub use scheduler::{SubmitError, TaskSubmitter};
pub use vault::{CookOptions, Vault};

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// With `filter` unset, `RUST_LOG` is honored and defaults to `info`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

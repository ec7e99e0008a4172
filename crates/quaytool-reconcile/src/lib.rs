//! Quaytool Reconciliation Engine
//!
//! Drives batch administration of a Quay registry: it lists a namespace,
//! narrows the listing to a working set, and applies one action per item,
//! checking current state first where the action is a creation.
//!
//! # Overview
//!
//! - **Working sets**: paginated namespace listing filtered by include/exclude names
//! - **Batch actions**: visibility, write permission, tag expiration and restore
//! - **Provisioning**: organizations, robots, teams, prototypes and team members,
//!   created only when a probe finds them absent
//! - **Reports**: every item ends as applied, already present, unchanged, skipped or failed
//!
//! # Example
//!
//! ```rust,no_run
//! use quaytool_core::{RepositorySelector, Visibility};
//! use quaytool_reconcile::{Reconciler, Request, Scope};
//! use quaytool_registry::{RegistryAuth, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("https://quay.example.com/api/v1")
//!         .with_auth(RegistryAuth::bearer("token"));
//!     let reconciler = Reconciler::new(RegistryClient::new(config)?);
//!
//!     let request = Request::SetVisibility {
//!         scope: Scope::new(Some("acme".to_string()), RepositorySelector::all()),
//!         visibility: Some(Visibility::Private),
//!     };
//!     let execution = reconciler.execute(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&execution)?);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod engine;
pub mod error;
pub mod outcome;
pub mod provision;
pub mod request;
pub mod tags;

pub use engine::{ImageListing, Reconciler};
pub use error::{ReconcileError, Result};
pub use outcome::{Action, BatchReport, ItemOutcome, Outcome};
pub use provision::{
    provision, MembershipSpec, OrganizationSpec, Presence, PrototypeSpec, Provision, RobotSpec,
    TeamSpec,
};
pub use request::{Execution, Request, Scope};
pub use tags::{ExpirationChange, TagAction};

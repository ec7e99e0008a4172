//! # Quaytool Registry
//!
//! HTTP client for the Quay registry control-plane API.
//!
//! This crate provides the request/response layer used by the reconciliation
//! engine, plus the paginator that assembles a namespace's full repository
//! listing.
//!
//! ## Features
//!
//! - **Bearer authentication**: application tokens sent on every call except discovery
//! - **TLS switch**: certificate verification can be turned off for self-signed registries
//! - **Pagination**: `next_page` cursors followed until exhausted or non-advancing
//! - **Existence probes**: 404 on a lookup maps to "absent" instead of an error
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quaytool_registry::{RegistryAuth, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("https://quay.example.com/api/v1")
//!         .with_auth(RegistryAuth::bearer("token"));
//!
//!     let client = RegistryClient::new(config)?;
//!     let repositories = client.list_repositories("acme").await?;
//!     println!("{} repositories", repositories.len());
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod error;
mod paginator;

pub use client::{RegistryClient, ROBOT_DESCRIPTION};
pub use config::{RegistryAuth, RegistryConfig, API_PATH_MARKER};
pub use error::RegistryError;
pub use paginator::{Listing, PageProgress, Paginator};

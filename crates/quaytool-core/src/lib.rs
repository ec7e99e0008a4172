//! # Quaytool Core
//!
//! Core types for the quaytool registry administration client.
//!
//! This crate provides the data structures shared by the registry client and
//! the reconciliation engine:
//!
//! - [`Repository`] - Repository snapshot from a namespace listing
//! - [`RepositoryPage`] - One page of that listing with its continuation token
//! - [`RepositorySelector`] - Include/exclude narrowing of a listing
//! - [`Tag`], [`Robot`], [`TeamMembers`], [`Prototype`] - Organization-scoped resources
//!
//! ## Example
//!
//! ```rust
//! use quaytool_core::{Repository, RepositorySelector, Visibility};
//!
//! let listing = vec![
//!     Repository::new("acme", "api").with_visibility(Visibility::Private),
//!     Repository::new("acme", "web").with_visibility(Visibility::Public),
//! ];
//!
//! let selector = RepositorySelector::new(Vec::<String>::new(), ["web"]);
//! let working_set = selector.select(&listing);
//! assert_eq!(working_set.len(), 1);
//! assert_eq!(working_set[0].path(), "acme/api");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod repository;
pub mod resources;
pub mod selector;


// Re-export main types at crate root
pub use error::{Error, Result};
pub use repository::{NewRepository, Repository, RepositoryPage, Visibility};
pub use resources::{
    Delegate, DelegateKind, NewTeam, Prototype, PrototypeList, Robot, RobotList, Tag, TagList,
    TeamMember, TeamMembers, TeamRole,
};
pub use selector::RepositorySelector;

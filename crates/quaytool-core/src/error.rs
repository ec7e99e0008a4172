//! Error types for quaytool core operations.
//!
//! This module defines the error types used throughout the `quaytool-core` crate.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quaytool core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A visibility value other than `public` or `private`.
    #[error("Invalid visibility '{value}': expected 'public' or 'private'")]
    InvalidVisibility {
        /// The rejected value.
        value: String,
    },

    /// A team role the registry does not know.
    #[error("Invalid team role '{value}': expected 'member', 'creator' or 'admin'")]
    InvalidTeamRole {
        /// The rejected value.
        value: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

//! Error types for the reconcile crate.
//!
//! Per-item failures inside a batch are recorded in the batch report and are
//! not errors at this level. What surfaces here either stops a batch or stops
//! it from starting.

use quaytool_registry::RegistryError;
use thiserror::Error;

use crate::outcome::BatchReport;

/// Result type alias for reconcile operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Errors that can occur while reconciling registry state.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A required input was not supplied; nothing was sent to the registry.
    #[error("{operation} needs {missing}")]
    Precondition {
        /// Operation that was requested.
        operation: &'static str,
        /// Description of the missing input.
        missing: String,
    },

    /// A call outside any per-item accounting failed (listing, read-only query).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A fail-fast batch stopped at its first failed item.
    #[error("{operation} halted at '{target}' after {applied} change(s): {source}")]
    BatchHalted {
        /// Operation that was running.
        operation: &'static str,
        /// Item that failed.
        target: String,
        /// Items changed before the failure.
        applied: usize,
        /// Report covering the items processed so far, including the failure.
        report: Box<BatchReport>,
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

impl ReconcileError {
    /// Creates a precondition error.
    pub fn precondition(operation: &'static str, missing: impl Into<String>) -> Self {
        Self::Precondition {
            operation,
            missing: missing.into(),
        }
    }

    /// Returns true if the whole run should be reported as failed.
    ///
    /// A missing input is reported to the operator but is not a failed run.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Precondition { .. })
    }

    /// Returns the partial report of a halted batch.
    pub fn partial_report(&self) -> Option<&BatchReport> {
        match self {
            Self::BatchHalted { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Unwraps a required input or fails with a precondition error.
pub(crate) fn required<'a>(
    operation: &'static str,
    value: Option<&'a str>,
    missing: &str,
) -> Result<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ReconcileError::precondition(operation, missing)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_display() {
        let err = ReconcileError::precondition("set-visibility", "--organization");
        assert_eq!(err.to_string(), "set-visibility needs --organization");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_registry_errors_are_fatal() {
        let err = ReconcileError::from(RegistryError::EmptyListing {
            namespace: "acme".to_string(),
        });
        assert!(err.is_fatal());
        assert!(err.to_string().contains("acme"));
        assert!(err.partial_report().is_none());
    }

    #[test]
    fn test_required() {
        assert_eq!(required("op", Some("acme"), "--organization").unwrap(), "acme");
        assert!(matches!(
            required("op", None, "--organization"),
            Err(ReconcileError::Precondition { operation: "op", .. })
        ));
        assert!(required("op", Some(""), "--organization").is_err());
    }
}

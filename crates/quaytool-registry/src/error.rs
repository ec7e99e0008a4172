//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Credentials could not be turned into request headers.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message.
        message: String,
    },

    /// Non-success HTTP status from the registry.
    #[error("HTTP error from registry: {status} at {url} - {message}")]
    HttpError {
        /// HTTP status code (0 when the request never produced one).
        status: u16,
        /// Request URL.
        url: String,
        /// Response body or transport message.
        message: String,
    },

    /// The namespace listing returned nothing usable.
    #[error("No repositories found in namespace '{namespace}'")]
    EmptyListing {
        /// Namespace that was listed.
        namespace: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// URL string.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl RegistryError {
    /// Returns the HTTP status, if the registry answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }

    /// Returns true for a 404 answer.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);

        if err.is_connect() {
            Self::ConnectionFailed { url, source: err }
        } else if err.is_decode() {
            Self::HttpError {
                status: err.status().map_or(0, |s| s.as_u16()),
                url,
                message: format!("undecodable response body: {err}"),
            }
        } else {
            Self::HttpError {
                status: err.status().map_or(0, |s| s.as_u16()),
                url,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_http() {
        let err = RegistryError::HttpError {
            status: 500,
            url: "https://quay.example.com/api/v1/repository".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error from registry: 500 at https://quay.example.com/api/v1/repository - boom"
        );
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_classification() {
        let err = RegistryError::HttpError {
            status: 404,
            url: String::new(),
            message: String::new(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_zero_is_not_a_status() {
        let err = RegistryError::HttpError {
            status: 0,
            url: String::new(),
            message: "reset".to_string(),
        };
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_error_display_empty_listing() {
        let err = RegistryError::EmptyListing {
            namespace: "acme".to_string(),
        };
        assert_eq!(err.to_string(), "No repositories found in namespace 'acme'");
    }
}

//! Configuration types for registry client.

use std::time::Duration;

use url::Url;

use crate::error::RegistryError;

/// Path fragment every registry API base URL must contain.
pub const API_PATH_MARKER: &str = "/api/v";

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// API base URL (e.g., "<https://quay.example.com/api/v1>").
    pub url: String,

    /// Authentication configuration.
    pub auth: RegistryAuth,

    /// Request timeout.
    pub timeout: Duration,

    /// Whether server certificates are verified.
    pub verify_tls: bool,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given API URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use quaytool_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://quay.example.com/api/v1");
    /// assert_eq!(config.url, "https://quay.example.com/api/v1");
    /// assert!(config.verify_tls);
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: RegistryAuth::None,
            timeout: Duration::from_secs(30),
            verify_tls: true,
            user_agent: format!("quaytool/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables certificate verification.
    #[must_use]
    pub const fn with_tls_verification(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Disables certificate verification.
    ///
    /// # Warning
    ///
    /// This should only be used against registries with self-signed certificates.
    #[must_use]
    pub const fn insecure(self) -> Self {
        self.with_tls_verification(false)
    }

    /// Parses and checks the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if the URL does not parse, cannot
    /// carry path segments, or does not point at a versioned API endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use quaytool_registry::RegistryConfig;
    ///
    /// assert!(RegistryConfig::new("https://quay.io/api/v1").base_url().is_ok());
    /// assert!(RegistryConfig::new("https://quay.io").base_url().is_err());
    /// ```
    pub fn base_url(&self) -> Result<Url, RegistryError> {
        if !self.url.contains(API_PATH_MARKER) {
            return Err(RegistryError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("missing API endpoint path ({API_PATH_MARKER}...)"),
            });
        }

        let url = Url::parse(&self.url).map_err(|e| RegistryError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(RegistryError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(url)
    }
}

/// Authentication methods for registry access.
#[derive(Clone)]
pub enum RegistryAuth {
    /// No authentication (discovery and public listings only).
    None,

    /// Bearer token authentication (application or OAuth token).
    Bearer {
        /// Token value.
        token: String,
    },
}

impl RegistryAuth {
    /// Creates bearer token authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use quaytool_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::bearer("my-token");
    /// assert!(auth.is_authenticated());
    /// ```
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Builds authentication from an optional token.
    #[must_use]
    pub fn from_token(token: Option<String>) -> Self {
        token.map_or(Self::None, |token| Self::Bearer { token })
    }

    /// Returns true if requests will carry credentials.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Bearer { .. })
    }
}

impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"<redacted>").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = RegistryConfig::new("https://quay.example.com/api/v1");
        assert_eq!(config.url, "https://quay.example.com/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.verify_tls);
        assert!(config.user_agent.starts_with("quaytool/"));
    }

    #[test]
    fn test_config_builders() {
        let config = RegistryConfig::new("https://quay.example.com/api/v1")
            .with_auth(RegistryAuth::bearer("t"))
            .with_timeout(Duration::from_secs(5))
            .insecure();

        assert!(config.auth.is_authenticated());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_base_url_requires_api_path() {
        let err = RegistryConfig::new("https://quay.example.com")
            .base_url()
            .unwrap_err();
        assert!(err.to_string().contains("/api/v"));
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(RegistryConfig::new("not a url /api/v1").base_url().is_err());
    }

    #[test]
    fn test_from_token() {
        assert!(!RegistryAuth::from_token(None).is_authenticated());
        assert!(RegistryAuth::from_token(Some("abc".to_string())).is_authenticated());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", RegistryAuth::bearer("super-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}

//! Repository records as reported by the registry listing endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Whether a repository's contents are publicly readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Anyone may pull.
    Public,
    /// Only users with explicit permissions may pull.
    Private,
}

impl Visibility {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(Error::InvalidVisibility {
                value: other.to_string(),
            }),
        }
    }
}

/// A repository snapshot taken from a listing call.
///
/// Identity is `(namespace, name)`. Records are never mutated locally; changes
/// go straight to the registry.
///
/// # Examples
///
/// ```rust
/// use quaytool_core::Repository;
///
/// let repo = Repository::new("acme", "api");
/// assert_eq!(repo.path(), "acme/api");
///
/// let root = Repository::root("base");
/// assert_eq!(root.path(), "/base");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    /// Owning namespace; `None` for a root-level repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Bare repository name.
    pub name: String,

    /// Public flag as reported by the registry; `None` when not reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl Repository {
    /// Creates a repository record inside `namespace`.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
            is_public: None,
        }
    }

    /// Creates a root-level repository record.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            is_public: None,
        }
    }

    /// Sets the reported visibility.
    #[must_use]
    pub const fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.is_public = Some(matches!(visibility, Visibility::Public));
        self
    }

    /// Returns the reported visibility, `None` meaning unknown.
    #[must_use]
    pub const fn visibility(&self) -> Option<Visibility> {
        match self.is_public {
            Some(true) => Some(Visibility::Public),
            Some(false) => Some(Visibility::Private),
            None => None,
        }
    }

    /// Returns the namespace, or the empty string for root-level repositories.
    #[must_use]
    pub fn namespace_or_root(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    /// Returns the `namespace/name` path (`/name` at the root).
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.namespace_or_root(), self.name)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace_or_root(), self.name)
    }
}

/// One page of the namespace repository listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPage {
    /// Repositories on this page; `None` when the field is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<Repository>>,

    /// Continuation token for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

impl RepositoryPage {
    /// Returns the continuation token, treating an empty token as absent.
    #[must_use]
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|token| !token.is_empty())
    }
}

/// Request body for creating a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRepository {
    /// Repository name.
    pub repository: String,
    /// Initial visibility.
    pub visibility: Visibility,
    /// Owning namespace.
    pub namespace: String,
    /// Free-form description.
    pub description: String,
    /// Repository kind; always `image` here.
    pub repo_kind: String,
}

impl NewRepository {
    /// Creates a public image repository request, matching what the registry
    /// UI produces by default.
    #[must_use]
    pub fn public_image(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repository: name.into(),
            visibility: Visibility::Public,
            namespace: namespace.into(),
            description: "None".to_string(),
            repo_kind: "image".to_string(),
        }
    }
}

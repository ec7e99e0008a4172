//! Include/exclude narrowing of a repository listing.

use std::collections::HashSet;

use crate::repository::Repository;

/// Narrows a repository listing to the working set of one invocation.
///
/// Matching is by bare repository name. Two repositories that share a name in
/// different namespaces cannot be told apart here.
///
/// # Examples
///
/// ```rust
/// use quaytool_core::{Repository, RepositorySelector};
///
/// let all = vec![
///     Repository::new("acme", "a"),
///     Repository::new("acme", "b"),
///     Repository::new("acme", "c"),
/// ];
/// let selector = RepositorySelector::new(["a", "c"], ["c"]);
/// let selected = selector.select(&all);
/// assert_eq!(selected, vec![Repository::new("acme", "a")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySelector {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl RepositorySelector {
    /// Creates a selector from an allow-list and a deny-list.
    ///
    /// An empty allow-list admits every name.
    #[must_use]
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a selector that keeps everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns true when neither list narrows anything.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Returns true if `repository` belongs to the working set.
    #[must_use]
    pub fn admits(&self, repository: &Repository) -> bool {
        (self.include.is_empty() || self.include.contains(&repository.name))
            && !self.exclude.contains(&repository.name)
    }

    /// Applies the selector, preserving the order of `all`.
    #[must_use]
    pub fn select(&self, all: &[Repository]) -> Vec<Repository> {
        all.iter().filter(|r| self.admits(r)).cloned().collect()
    }
}

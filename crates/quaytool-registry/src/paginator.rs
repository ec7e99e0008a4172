//! Cursor-driven assembly of a namespace's repository listing.
//!
//! Some registry versions hand back a `next_page` token that never advances:
//! the next page repeats repositories already seen. The loop stops as soon as
//! a page contributes nothing new (a page without a `repositories` field
//! included), so it terminates even when the token still looks valid.

use std::collections::HashSet;

use quaytool_core::Repository;

use crate::client::RegistryClient;
use crate::error::RegistryError;

/// Whether a fetched page added anything to the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageProgress {
    /// At least one repository was new.
    Advanced,
    /// Every repository on the page had been seen already.
    Stalled,
}

/// Accumulated listing with duplicate tracking.
#[derive(Debug, Default, Clone)]
pub struct Listing {
    repositories: Vec<Repository>,
    seen: HashSet<Repository>,
}

impl Listing {
    /// Creates an empty listing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the unseen repositories of a page, in page order.
    ///
    /// A page whose repositories are all known (including an empty page)
    /// reports [`PageProgress::Stalled`] and leaves the listing unchanged.
    pub fn absorb(&mut self, page: Vec<Repository>) -> PageProgress {
        if page.iter().all(|repo| self.seen.contains(repo)) {
            return PageProgress::Stalled;
        }

        for repo in page {
            if self.seen.insert(repo.clone()) {
                self.repositories.push(repo);
            }
        }
        PageProgress::Advanced
    }

    /// Number of distinct repositories collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Consumes the listing, returning repositories in first-seen order.
    #[must_use]
    pub fn into_repositories(self) -> Vec<Repository> {
        self.repositories
    }
}

/// Drives repeated page fetches for one namespace.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'a> {
    client: &'a RegistryClient,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator over `client`.
    #[must_use]
    pub const fn new(client: &'a RegistryClient) -> Self {
        Self { client }
    }

    /// Lists every repository in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyListing`] if the first page is `null` or
    /// lacks a `repositories` field, and propagates any transport or status
    /// error without retrying.
    pub async fn list_repositories(
        &self,
        namespace: &str,
    ) -> Result<Vec<Repository>, RegistryError> {
        let first = self.client.repository_page(namespace, None).await?;
        let Some(first) = first else {
            return Err(RegistryError::EmptyListing {
                namespace: namespace.to_string(),
            });
        };

        let mut token = first.next_page_token().map(ToOwned::to_owned);
        let Some(repositories) = first.repositories else {
            return Err(RegistryError::EmptyListing {
                namespace: namespace.to_string(),
            });
        };

        let mut listing = Listing::new();
        listing.absorb(repositories);
        let mut pages = 1_usize;

        while let Some(current) = token.take() {
            let page = self
                .client
                .repository_page(namespace, Some(&current))
                .await?
                .unwrap_or_default();
            pages += 1;

            let next = page.next_page_token().map(ToOwned::to_owned);
            let progress = page
                .repositories
                .map_or(PageProgress::Stalled, |repositories| {
                    listing.absorb(repositories)
                });
            if progress == PageProgress::Stalled {
                tracing::debug!(
                    namespace,
                    page = pages,
                    "page adds no repositories, stopping pagination"
                );
                break;
            }
            token = next;
        }

        tracing::info!(
            namespace,
            pages,
            repositories = listing.len(),
            "listed namespace repositories"
        );

        Ok(listing.into_repositories())
    }
}

//! Repository-scoped commands.

use clap::Args;
use quaytool_core::{RepositorySelector, Visibility};
use quaytool_reconcile::{Request, Scope};

/// Include/exclude filter over the organization's repositories.
#[derive(Args, Debug, Clone, Default)]
pub struct RepositoryFilter {
    /// Apply only to this repository (repeatable)
    #[arg(long = "repository", value_name = "NAME")]
    pub include: Vec<String>,

    /// Leave this repository untouched (repeatable)
    #[arg(long = "skip-repo", value_name = "NAME")]
    pub exclude: Vec<String>,
}

impl RepositoryFilter {
    fn scope(self, organization: Option<String>) -> Scope {
        Scope::new(
            organization,
            RepositorySelector::new(self.include, self.exclude),
        )
    }
}

/// Arguments for the set-visibility command.
#[derive(Args, Debug)]
pub struct SetVisibilityArgs {
    /// Target visibility (public, private)
    #[arg(long)]
    pub visibility: Option<Visibility>,

    #[command(flatten)]
    pub filter: RepositoryFilter,
}

impl SetVisibilityArgs {
    pub fn into_request(self, organization: Option<String>) -> Request {
        Request::SetVisibility {
            scope: self.filter.scope(organization),
            visibility: self.visibility,
        }
    }
}

/// Arguments for the set-permissions command.
#[derive(Args, Debug)]
pub struct SetPermissionsArgs {
    /// User receiving write permission
    #[arg(long)]
    pub user: Option<String>,

    #[command(flatten)]
    pub filter: RepositoryFilter,
}

impl SetPermissionsArgs {
    pub fn into_request(self, organization: Option<String>) -> Request {
        Request::SetPermissions {
            scope: self.filter.scope(organization),
            user: self.user,
        }
    }
}

/// Arguments for the expire-tag command.
#[derive(Args, Debug)]
pub struct ExpireTagArgs {
    /// Tag name
    #[arg(long)]
    pub tag: Option<String>,

    /// Days until the tag expires; 0 removes the expiration
    #[arg(long, allow_negative_numbers = true)]
    pub days: i64,

    #[command(flatten)]
    pub filter: RepositoryFilter,
}

impl ExpireTagArgs {
    pub fn into_request(self, organization: Option<String>) -> Request {
        Request::ExpireTag {
            scope: self.filter.scope(organization),
            tag: self.tag,
            days: self.days,
        }
    }
}

/// Arguments for the restore-tag command.
#[derive(Args, Debug)]
pub struct RestoreTagArgs {
    /// Tag name
    #[arg(long)]
    pub tag: Option<String>,

    #[command(flatten)]
    pub filter: RepositoryFilter,
}

impl RestoreTagArgs {
    pub fn into_request(self, organization: Option<String>) -> Request {
        Request::RestoreTag {
            scope: self.filter.scope(organization),
            tag: self.tag,
        }
    }
}

/// Arguments for commands that take explicit repository names.
#[derive(Args, Debug)]
pub struct RepositoryNames {
    /// Repository name (repeatable)
    #[arg(long = "repository", value_name = "NAME")]
    pub repositories: Vec<String>,
}

/// Arguments for the list-repositories command.
#[derive(Args, Debug)]
pub struct ListRepositoriesArgs {
    /// Only list public repositories
    #[arg(long)]
    pub public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaytool_core::Repository;

    #[test]
    fn test_filter_scope() {
        let filter = RepositoryFilter {
            include: vec!["a".to_string(), "b".to_string()],
            exclude: vec!["b".to_string()],
        };
        let scope = filter.scope(Some("acme".to_string()));

        assert_eq!(scope.organization.as_deref(), Some("acme"));
        assert!(scope.selector.admits(&Repository::new("acme", "a")));
        assert!(!scope.selector.admits(&Repository::new("acme", "b")));
        assert!(!scope.selector.admits(&Repository::new("acme", "c")));
    }

    #[test]
    fn test_empty_filter_admits_everything() {
        let scope = RepositoryFilter::default().scope(None);
        assert!(scope.selector.is_unfiltered());
    }
}

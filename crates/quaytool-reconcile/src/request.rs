//! Action selection handed over by the command line.
//!
//! Inputs arrive unvalidated; [`Reconciler::execute`] checks that everything
//! an action needs is present before the first registry call.

use chrono::Utc;
use quaytool_core::{PrototypeList, RepositorySelector, RobotList, TeamRole, Visibility};
use serde::Serialize;
use serde_json::Value;

use crate::engine::{ImageListing, Reconciler};
use crate::error::{required, ReconcileError, Result};
use crate::outcome::BatchReport;
use crate::tags::{ExpirationChange, TagAction};

const ORGANIZATION: &str = "--organization";

/// Repositories an action applies to.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Namespace to list.
    pub organization: Option<String>,
    /// Include/exclude filter applied to the listing.
    pub selector: RepositorySelector,
}

impl Scope {
    /// Creates a scope over `organization` filtered by `selector`.
    pub fn new(organization: Option<String>, selector: RepositorySelector) -> Self {
        Self {
            organization,
            selector,
        }
    }
}

/// One action requested by the operator.
#[derive(Debug, Clone)]
pub enum Request {
    /// Fetch the API discovery document.
    Info,
    /// Set visibility on the selected repositories.
    SetVisibility {
        /// Target repositories.
        scope: Scope,
        /// Desired visibility.
        visibility: Option<Visibility>,
    },
    /// Grant a user write on the selected repositories.
    SetPermissions {
        /// Target repositories.
        scope: Scope,
        /// User to grant.
        user: Option<String>,
    },
    /// Set or clear a tag's expiration on the selected repositories.
    ExpireTag {
        /// Target repositories.
        scope: Scope,
        /// Tag name.
        tag: Option<String>,
        /// Days from now; zero clears, negative writes nothing.
        days: i64,
    },
    /// Restore a tag on the selected repositories.
    RestoreTag {
        /// Target repositories.
        scope: Scope,
        /// Tag name.
        tag: Option<String>,
    },
    /// List images of named repositories.
    ListImages {
        /// Namespace, if any.
        organization: Option<String>,
        /// Repository names.
        repositories: Vec<String>,
    },
    /// List repositories registry-wide.
    ListRepositories {
        /// Narrow to one namespace.
        organization: Option<String>,
        /// Only public repositories.
        public_only: bool,
    },
    /// List robots of an organization.
    ListRobots {
        /// Organization.
        organization: Option<String>,
    },
    /// List prototypes of an organization.
    ListPrototypes {
        /// Organization.
        organization: Option<String>,
    },
    /// Create repositories by name.
    CreateRepository {
        /// Organization.
        organization: Option<String>,
        /// Repository names.
        repositories: Vec<String>,
    },
    /// Create an organization.
    CreateOrganization {
        /// Organization.
        organization: Option<String>,
    },
    /// Create a robot.
    CreateRobot {
        /// Organization.
        organization: Option<String>,
        /// Robot short name.
        robot: Option<String>,
    },
    /// Regenerate a robot token.
    RegenerateToken {
        /// Organization.
        organization: Option<String>,
        /// Robot short name.
        robot: Option<String>,
    },
    /// Create a team.
    CreateTeam {
        /// Organization.
        organization: Option<String>,
        /// Team name.
        team: Option<String>,
        /// Organization role of the team.
        role: TeamRole,
    },
    /// Add a user to a team.
    AddMember {
        /// Organization.
        organization: Option<String>,
        /// Team name.
        team: Option<String>,
        /// User to add.
        user: Option<String>,
    },
    /// Create a default-permission prototype.
    CreatePrototype {
        /// Organization.
        organization: Option<String>,
        /// User delegate.
        user: Option<String>,
        /// Team delegate.
        team: Option<String>,
    },
}

impl Request {
    /// Returns the command name of this request.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::SetVisibility { .. } => "set-visibility",
            Self::SetPermissions { .. } => "set-permissions",
            Self::ExpireTag { .. } => "expire-tag",
            Self::RestoreTag { .. } => "restore-tag",
            Self::ListImages { .. } => "list-images",
            Self::ListRepositories { .. } => "list-repositories",
            Self::ListRobots { .. } => "list-robots",
            Self::ListPrototypes { .. } => "list-prototypes",
            Self::CreateRepository { .. } => "create-repository",
            Self::CreateOrganization { .. } => "create-organization",
            Self::CreateRobot { .. } => "create-robot",
            Self::RegenerateToken { .. } => "regenerate-token",
            Self::CreateTeam { .. } => "create-team",
            Self::AddMember { .. } => "add-member",
            Self::CreatePrototype { .. } => "create-prototype",
        }
    }
}

/// What an executed request produced.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Execution {
    /// A mutating batch and its per-item outcomes.
    Report(BatchReport),
    /// Robot listing.
    Robots(RobotList),
    /// Prototype listing.
    Prototypes(PrototypeList),
    /// Image listings in request order.
    Images(Vec<ImageListing>),
    /// Any other document returned by the registry.
    Document(Value),
}

impl Reconciler {
    /// Validates and runs `request`.
    ///
    /// # Errors
    ///
    /// Returns a precondition error before any registry call when a required
    /// input is missing, a registry error when a listing or query fails, and
    /// a halted-batch error when a fail-fast batch stops.
    pub async fn execute(&self, request: &Request) -> Result<Execution> {
        let op = request.name();

        let execution = match request {
            Request::Info => Execution::Document(self.discovery_info().await?),

            Request::SetVisibility { scope, visibility } => {
                let namespace = required(op, scope.organization.as_deref(), ORGANIZATION)?;
                let visibility = visibility
                    .ok_or_else(|| ReconcileError::precondition(op, "--visibility"))?;
                let repositories = self.working_set(namespace, &scope.selector).await?;
                Execution::Report(self.set_visibility(&repositories, visibility).await?)
            }

            Request::SetPermissions { scope, user } => {
                let namespace = required(op, scope.organization.as_deref(), ORGANIZATION)?;
                let user = required(op, user.as_deref(), "--user")?;
                let repositories = self.working_set(namespace, &scope.selector).await?;
                Execution::Report(
                    self.grant_write_permission(&repositories, namespace, user)
                        .await?,
                )
            }

            Request::ExpireTag { scope, tag, days } => {
                let namespace = required(op, scope.organization.as_deref(), ORGANIZATION)?;
                let tag = required(op, tag.as_deref(), "--tag")?;
                let change = ExpirationChange::from_days(*days, Utc::now())?;
                let repositories = self.working_set(namespace, &scope.selector).await?;
                Execution::Report(
                    self.apply_tag_action(&repositories, namespace, tag, TagAction::Expire(change))
                        .await?,
                )
            }

            Request::RestoreTag { scope, tag } => {
                let namespace = required(op, scope.organization.as_deref(), ORGANIZATION)?;
                let tag = required(op, tag.as_deref(), "--tag")?;
                let repositories = self.working_set(namespace, &scope.selector).await?;
                Execution::Report(
                    self.apply_tag_action(&repositories, namespace, tag, TagAction::Restore)
                        .await?,
                )
            }

            Request::ListImages {
                organization,
                repositories,
            } => {
                if repositories.is_empty() {
                    return Err(ReconcileError::precondition(op, "--repository"));
                }
                Execution::Images(
                    self.list_images(organization.as_deref(), repositories)
                        .await?,
                )
            }

            Request::ListRepositories {
                organization,
                public_only,
            } => Execution::Document(
                self.list_repositories_global(organization.as_deref(), *public_only)
                    .await?,
            ),

            Request::ListRobots { organization } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                Execution::Robots(self.list_robots(organization).await?)
            }

            Request::ListPrototypes { organization } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                Execution::Prototypes(self.list_prototypes(organization).await?)
            }

            Request::CreateRepository {
                organization,
                repositories,
            } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                if repositories.is_empty() {
                    return Err(ReconcileError::precondition(op, "--repository"));
                }
                Execution::Report(self.create_repositories(organization, repositories).await?)
            }

            Request::CreateOrganization { organization } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                Execution::Report(self.create_organization(organization).await)
            }

            Request::CreateRobot {
                organization,
                robot,
            } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                let robot = required(op, robot.as_deref(), "--robot")?;
                Execution::Report(self.create_robot(organization, robot).await)
            }

            Request::RegenerateToken {
                organization,
                robot,
            } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                let robot = required(op, robot.as_deref(), "--robot")?;
                Execution::Document(self.regenerate_robot_token(organization, robot).await?)
            }

            Request::CreateTeam {
                organization,
                team,
                role,
            } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                let team = required(op, team.as_deref(), "--team")?;
                Execution::Report(self.create_team(organization, team, *role).await)
            }

            Request::AddMember {
                organization,
                team,
                user,
            } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                let team = required(op, team.as_deref(), "--team")?;
                let user = required(op, user.as_deref(), "--user")?;
                Execution::Report(self.add_team_member(organization, team, user).await)
            }

            Request::CreatePrototype {
                organization,
                user,
                team,
            } => {
                let organization = required(op, organization.as_deref(), ORGANIZATION)?;
                Execution::Report(
                    self.create_prototype(organization, user.as_deref(), team.as_deref())
                        .await?,
                )
            }
        };

        Ok(execution)
    }
}

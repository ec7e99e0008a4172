//! Probe-then-create provisioning of organization resources.
//!
//! Every resource kind supplies its own existence check and its own creating
//! call; [`provision`] runs the shared path so that a second run against an
//! unchanged registry sends no creating request.

use async_trait::async_trait;
use quaytool_core::{Delegate, NewTeam, Prototype, Robot, TeamRole};
use quaytool_registry::{RegistryClient, RegistryError};
use serde_json::Value;

use crate::outcome::{Action, BatchReport, Outcome};

/// Result of an existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The resource exists.
    Present,
    /// The resource does not exist.
    Absent,
    /// A resource the target depends on does not exist.
    ParentMissing,
}

impl From<bool> for Presence {
    fn from(present: bool) -> Self {
        if present {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

/// A resource that can be created if it is not already there.
#[async_trait]
pub trait Provision: Send + Sync {
    /// Action reported for this resource.
    fn action(&self) -> Action;

    /// Key identifying the resource in reports and logs.
    fn key(&self) -> String;

    /// Names the resource this one depends on, for skip reports.
    fn parent(&self) -> String {
        "parent resource".to_string()
    }

    /// Checks whether the resource exists.
    async fn probe(&self, client: &RegistryClient) -> Result<Presence, RegistryError>;

    /// Creates the resource, returning any payload worth showing.
    async fn create(&self, client: &RegistryClient) -> Result<Option<Value>, RegistryError>;
}

/// Runs the probe-then-create path for one resource.
///
/// Probe and create failures are recorded in the report rather than returned.
pub async fn provision(client: &RegistryClient, resource: &dyn Provision) -> BatchReport {
    let mut report = BatchReport::new(resource.action());
    let key = resource.key();

    let outcome = match resource.probe(client).await {
        Ok(Presence::Present) => {
            tracing::info!(run_id = %report.run_id, resource = %key, "already exists");
            Outcome::AlreadyExists
        }
        Ok(Presence::ParentMissing) => {
            let parent = resource.parent();
            tracing::warn!(
                run_id = %report.run_id,
                resource = %key,
                parent = %parent,
                "parent not found"
            );
            Outcome::skipped(format!("{parent} not found"))
        }
        Ok(Presence::Absent) => match resource.create(client).await {
            Ok(detail) => {
                tracing::info!(
                    run_id = %report.run_id,
                    resource = %key,
                    action = %resource.action(),
                    "created"
                );
                Outcome::Applied { detail }
            }
            Err(e) => {
                tracing::warn!(
                    run_id = %report.run_id,
                    resource = %key,
                    error = %e,
                    "create failed"
                );
                Outcome::failed(e)
            }
        },
        Err(e) => {
            tracing::warn!(
                run_id = %report.run_id,
                resource = %key,
                error = %e,
                "existence probe failed"
            );
            Outcome::failed(e)
        }
    };

    report.record(key, outcome);
    report
}

/// An organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationSpec {
    /// Organization name.
    pub name: String,
}

#[async_trait]
impl Provision for OrganizationSpec {
    fn action(&self) -> Action {
        Action::CreateOrganization
    }

    fn key(&self) -> String {
        self.name.clone()
    }

    async fn probe(&self, client: &RegistryClient) -> Result<Presence, RegistryError> {
        Ok(client.organization(&self.name).await?.is_some().into())
    }

    async fn create(&self, client: &RegistryClient) -> Result<Option<Value>, RegistryError> {
        client.create_organization(&self.name).await?;
        Ok(None)
    }
}

/// A robot account inside an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotSpec {
    /// Owning organization.
    pub organization: String,
    /// Short robot name (without the organization prefix).
    pub name: String,
}

#[async_trait]
impl Provision for RobotSpec {
    fn action(&self) -> Action {
        Action::CreateRobot
    }

    fn key(&self) -> String {
        Robot::account_name(&self.organization, &self.name)
    }

    async fn probe(&self, client: &RegistryClient) -> Result<Presence, RegistryError> {
        let robots = client.list_robots(&self.organization).await?;
        Ok(robots.contains(&self.organization, &self.name).into())
    }

    async fn create(&self, client: &RegistryClient) -> Result<Option<Value>, RegistryError> {
        client
            .create_robot(&self.organization, &self.name)
            .await
            .map(Some)
    }
}

/// A team inside an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSpec {
    /// Owning organization.
    pub organization: String,
    /// Team name.
    pub name: String,
    /// Organization role granted to the team.
    pub role: TeamRole,
}

#[async_trait]
impl Provision for TeamSpec {
    fn action(&self) -> Action {
        Action::CreateTeam
    }

    fn key(&self) -> String {
        format!("{}/{}", self.organization, self.name)
    }

    async fn probe(&self, client: &RegistryClient) -> Result<Presence, RegistryError> {
        let members = client.team_members(&self.organization, &self.name).await?;
        Ok(members.is_some().into())
    }

    async fn create(&self, client: &RegistryClient) -> Result<Option<Value>, RegistryError> {
        let team = NewTeam::with_role(self.role);
        client
            .create_team(&self.organization, &self.name, &team)
            .await?;
        Ok(None)
    }
}

/// A write-role default permission for a user or a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrototypeSpec {
    /// Owning organization.
    pub organization: String,
    /// User delegate, if supplied.
    pub user: Option<String>,
    /// Team delegate, if supplied. Takes precedence over `user` when creating.
    pub team: Option<String>,
}

impl PrototypeSpec {
    /// Returns the delegate the rule is created for; `None` if neither
    /// a user nor a team was supplied.
    pub fn delegate(&self) -> Option<Delegate> {
        self.team
            .as_deref()
            .map(Delegate::team)
            .or_else(|| self.user.as_deref().map(Delegate::user))
    }
}

#[async_trait]
impl Provision for PrototypeSpec {
    fn action(&self) -> Action {
        Action::CreatePrototype
    }

    fn key(&self) -> String {
        let name = self
            .team
            .as_deref()
            .or(self.user.as_deref())
            .unwrap_or_default();
        format!("{}:{name}", self.organization)
    }

    async fn probe(&self, client: &RegistryClient) -> Result<Presence, RegistryError> {
        let prototypes = client.list_prototypes(&self.organization).await?;
        let present = [self.user.as_deref(), self.team.as_deref()]
            .into_iter()
            .flatten()
            .any(|name| prototypes.has_delegate(name));
        Ok(present.into())
    }

    async fn create(&self, client: &RegistryClient) -> Result<Option<Value>, RegistryError> {
        let Some(delegate) = self.delegate() else {
            return Ok(None);
        };
        client
            .create_prototype(&self.organization, &Prototype::write(delegate))
            .await?;
        Ok(None)
    }
}

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSpec {
    /// Owning organization.
    pub organization: String,
    /// Team name.
    pub team: String,
    /// User to add.
    pub user: String,
}

#[async_trait]
impl Provision for MembershipSpec {
    fn action(&self) -> Action {
        Action::AddTeamMember
    }

    fn key(&self) -> String {
        format!("{}/{}:{}", self.organization, self.team, self.user)
    }

    fn parent(&self) -> String {
        format!("team {}/{}", self.organization, self.team)
    }

    async fn probe(&self, client: &RegistryClient) -> Result<Presence, RegistryError> {
        let presence = match client.team_members(&self.organization, &self.team).await? {
            Some(members) => members.contains(&self.user).into(),
            None => Presence::ParentMissing,
        };
        Ok(presence)
    }

    async fn create(&self, client: &RegistryClient) -> Result<Option<Value>, RegistryError> {
        client
            .add_team_member(&self.organization, &self.team, &self.user)
            .await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaytool_core::DelegateKind;

    #[test]
    fn test_presence_from_bool() {
        assert_eq!(Presence::from(true), Presence::Present);
        assert_eq!(Presence::from(false), Presence::Absent);
    }

    #[test]
    fn test_keys() {
        let robot = RobotSpec {
            organization: "acme".to_string(),
            name: "ci".to_string(),
        };
        assert_eq!(robot.key(), "acme+ci");

        let team = TeamSpec {
            organization: "acme".to_string(),
            name: "devs".to_string(),
            role: TeamRole::default(),
        };
        assert_eq!(team.key(), "acme/devs");

        let membership = MembershipSpec {
            organization: "acme".to_string(),
            team: "devs".to_string(),
            user: "alice".to_string(),
        };
        assert_eq!(membership.key(), "acme/devs:alice");
    }

    #[test]
    fn test_prototype_team_takes_precedence() {
        let spec = PrototypeSpec {
            organization: "acme".to_string(),
            user: Some("alice".to_string()),
            team: Some("devs".to_string()),
        };
        let delegate = spec.delegate().unwrap();
        assert_eq!(delegate.kind, DelegateKind::Team);
        assert_eq!(delegate.name, "devs");
        assert_eq!(spec.key(), "acme:devs");

        let user_only = PrototypeSpec {
            team: None,
            ..spec
        };
        assert_eq!(user_only.delegate().unwrap().kind, DelegateKind::User);
    }

    #[test]
    fn test_prototype_without_delegate() {
        let spec = PrototypeSpec {
            organization: "acme".to_string(),
            user: None,
            team: None,
        };
        assert!(spec.delegate().is_none());
    }
}

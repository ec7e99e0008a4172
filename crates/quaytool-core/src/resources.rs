//! Organization-scoped resources: tags, robots, teams and prototypes.
//!
//! Fields the engine does not consume are kept opaque in `extra` maps so that
//! read-only listings can be echoed back unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// A tag within one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,

    /// Digest of the manifest the tag points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_digest: Option<String>,

    /// Expiration as a Unix timestamp; `None` when the tag never expires.
    #[serde(default, rename = "end_ts", skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

/// Tag listing for a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagList {
    /// Tags; `None` when the registry omitted the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

impl TagList {
    /// Finds a tag by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Tag> {
        self.tags.as_ref()?.iter().find(|tag| tag.name == name)
    }
}

/// A robot account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    /// Fully qualified name, `<organization>+<robot>`.
    pub name: String,

    /// Token, permissions and metadata, kept as reported.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Robot {
    /// Builds the fully qualified robot account name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quaytool_core::Robot;
    ///
    /// assert_eq!(Robot::account_name("acme", "ci"), "acme+ci");
    /// ```
    #[must_use]
    pub fn account_name(organization: &str, robot: &str) -> String {
        format!("{organization}+{robot}")
    }
}

/// Robot listing for an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotList {
    /// Robots in the organization.
    #[serde(default)]
    pub robots: Vec<Robot>,
}

impl RobotList {
    /// Returns true if `<organization>+<robot>` is in the listing.
    #[must_use]
    pub fn contains(&self, organization: &str, robot: &str) -> bool {
        let account = Robot::account_name(organization, robot);
        self.robots.iter().any(|r| r.name == account)
    }
}

/// Role granted to a team inside its organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Can read repositories the team is granted.
    Member,
    /// Can additionally create repositories.
    #[default]
    Creator,
    /// Full organization administration.
    Admin,
}

impl TeamRole {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Creator => "creator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "creator" => Ok(Self::Creator),
            "admin" => Ok(Self::Admin),
            other => Err(Error::InvalidTeamRole {
                value: other.to_string(),
            }),
        }
    }
}

/// Request body for creating a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    /// Organization role of the team.
    pub role: TeamRole,
    /// Free-form description.
    pub description: String,
}

impl NewTeam {
    /// Creates a team request with the registry UI's placeholder description.
    #[must_use]
    pub fn with_role(role: TeamRole) -> Self {
        Self {
            role,
            description: "None".to_string(),
        }
    }
}

/// A team member entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// User (or robot) name.
    pub name: String,

    /// Remaining member attributes.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Members lookup for a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMembers {
    /// Team members.
    #[serde(default)]
    pub members: Vec<TeamMember>,

    /// Remaining response attributes.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl TeamMembers {
    /// Returns true if `user` is a member.
    #[must_use]
    pub fn contains(&self, user: &str) -> bool {
        self.members.iter().any(|m| m.name == user)
    }
}

/// Kind of principal a prototype delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegateKind {
    /// A user account.
    User,
    /// A team in the organization.
    Team,
}

/// Principal receiving a default permission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegate {
    /// Principal name.
    pub name: String,

    /// Principal kind.
    pub kind: DelegateKind,

    /// Remaining delegate attributes.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Delegate {
    /// Creates a user delegate.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DelegateKind::User,
            details: Map::new(),
        }
    }

    /// Creates a team delegate.
    #[must_use]
    pub fn team(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DelegateKind::Team,
            details: Map::new(),
        }
    }
}

/// A default-permission rule for an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    /// Repository role granted to the delegate.
    pub role: String,

    /// Who receives the role.
    pub delegate: Delegate,

    /// Remaining prototype attributes (id, activating user, ...).
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Prototype {
    /// Creates a write-role rule for `delegate`.
    #[must_use]
    pub fn write(delegate: Delegate) -> Self {
        Self {
            role: "write".to_string(),
            delegate,
            details: Map::new(),
        }
    }
}

/// Prototype listing for an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrototypeList {
    /// Default-permission rules.
    #[serde(default)]
    pub prototypes: Vec<Prototype>,
}

impl PrototypeList {
    /// Returns true if any rule delegates to a principal named `name`.
    #[must_use]
    pub fn has_delegate(&self, name: &str) -> bool {
        self.prototypes.iter().any(|p| p.delegate.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_list_find() {
        let list: TagList = serde_json::from_value(json!({
            "tags": [
                {"name": "latest", "manifest_digest": "sha256:aaa", "end_ts": 1_700_000_000},
                {"name": "v1", "manifest_digest": "sha256:bbb"}
            ],
            "page": 1,
            "has_additional": false
        }))
        .unwrap();

        let tag = list.find("latest").unwrap();
        assert_eq!(tag.manifest_digest.as_deref(), Some("sha256:aaa"));
        assert_eq!(tag.expiration, Some(1_700_000_000));
        assert!(list.find("v1").unwrap().expiration.is_none());
        assert!(list.find("v2").is_none());
    }

    #[test]
    fn test_tag_list_without_tags_field() {
        let list: TagList = serde_json::from_value(json!({})).unwrap();
        assert!(list.tags.is_none());
        assert!(list.find("latest").is_none());
    }

    #[test]
    fn test_robot_list_contains_composite_name() {
        let list: RobotList = serde_json::from_value(json!({
            "robots": [{"name": "acme+ci", "token": "secret", "repositories": []}]
        }))
        .unwrap();

        assert!(list.contains("acme", "ci"));
        assert!(!list.contains("acme", "deploy"));
        assert!(!list.contains("other", "ci"));
        assert_eq!(list.robots[0].details["token"], "secret");
    }

    #[test]
    fn test_team_role_parse() {
        assert_eq!("admin".parse::<TeamRole>().unwrap(), TeamRole::Admin);
        assert_eq!(TeamRole::default(), TeamRole::Creator);
        assert!("owner".parse::<TeamRole>().is_err());
    }

    #[test]
    fn test_new_team_body() {
        let body = serde_json::to_value(NewTeam::with_role(TeamRole::Member)).unwrap();
        assert_eq!(body, json!({"role": "member", "description": "None"}));
    }

    #[test]
    fn test_team_members_contains() {
        let members: TeamMembers = serde_json::from_value(json!({
            "name": "owners",
            "members": [{"name": "alice", "kind": "user"}],
            "can_edit": true
        }))
        .unwrap();

        assert!(members.contains("alice"));
        assert!(!members.contains("bob"));
    }

    #[test]
    fn test_prototype_write_body() {
        let body = serde_json::to_value(Prototype::write(Delegate::team("devs"))).unwrap();
        assert_eq!(
            body,
            json!({"role": "write", "delegate": {"name": "devs", "kind": "team"}})
        );
    }

    #[test]
    fn test_prototype_list_has_delegate() {
        let list: PrototypeList = serde_json::from_value(json!({
            "prototypes": [{
                "id": "a1b2",
                "role": "read",
                "delegate": {"name": "bob", "kind": "user", "is_robot": false}
            }]
        }))
        .unwrap();

        assert!(list.has_delegate("bob"));
        assert!(!list.has_delegate("devs"));
        assert_eq!(list.prototypes[0].details["id"], "a1b2");
    }
}

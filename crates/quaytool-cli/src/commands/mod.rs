//! CLI commands and argument parsing.

pub mod organizations;
pub mod output;
pub mod repositories;

use clap::{Args, Parser, Subcommand};
use quaytool_reconcile::Request;

use organizations::{MemberArgs, PrototypeArgs, RobotArgs, TeamArgs};
use output::OutputFormat;
use repositories::{
    ExpireTagArgs, ListRepositoriesArgs, RepositoryNames, RestoreTagArgs, SetPermissionsArgs,
    SetVisibilityArgs,
};

/// Quaytool - administer repositories and organizations of a Quay registry
#[derive(Parser, Debug)]
#[command(name = "quaytool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Quay API URL, including the endpoint path (e.g., `<https://quay.example.com/api/v1>`)
    #[arg(long, env = "QUAY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Application token
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Quay organization (namespace)
    #[arg(long, global = true)]
    pub organization: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Be more verbose
    #[arg(long, global = true)]
    pub debug: bool,

    /// Request timeout in seconds
    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub timeout: u64,

    /// Output format (text, json)
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show registry API information
    Info,

    /// Set visibility for the organization's repositories
    SetVisibility(SetVisibilityArgs),

    /// Give a user write permission on the organization's repositories
    SetPermissions(SetPermissionsArgs),

    /// Show images in repositories
    ListImages(RepositoryNames),

    /// List repositories across the registry
    ListRepositories(ListRepositoriesArgs),

    /// List robots in the organization, with tokens and permissions
    ListRobots,

    /// List default permissions of the organization
    ListPrototypes,

    /// Create public repositories in the organization
    CreateRepository(RepositoryNames),

    /// Create the organization
    CreateOrganization,

    /// Create a robot in the organization
    CreateRobot(RobotArgs),

    /// Give a user or team write on new repositories by default
    CreatePrototype(PrototypeArgs),

    /// Create a team in the organization
    CreateTeam(TeamArgs),

    /// Regenerate a robot token
    RegenerateToken(RobotArgs),

    /// Add a user to a team
    AddMember(MemberArgs),

    /// Point a tag back at its current manifest
    RestoreTag(RestoreTagArgs),

    /// Set in how many days a tag expires
    ExpireTag(ExpireTagArgs),
}

impl Commands {
    /// Builds the engine request for this command.
    pub fn into_request(self, organization: Option<String>) -> Request {
        match self {
            Self::Info => Request::Info,
            Self::SetVisibility(args) => args.into_request(organization),
            Self::SetPermissions(args) => args.into_request(organization),
            Self::ExpireTag(args) => args.into_request(organization),
            Self::RestoreTag(args) => args.into_request(organization),
            Self::ListImages(args) => Request::ListImages {
                organization,
                repositories: args.repositories,
            },
            Self::ListRepositories(args) => Request::ListRepositories {
                organization,
                public_only: args.public,
            },
            Self::ListRobots => Request::ListRobots { organization },
            Self::ListPrototypes => Request::ListPrototypes { organization },
            Self::CreateRepository(args) => Request::CreateRepository {
                organization,
                repositories: args.repositories,
            },
            Self::CreateOrganization => Request::CreateOrganization { organization },
            Self::CreateRobot(args) => Request::CreateRobot {
                organization,
                robot: args.robot,
            },
            Self::RegenerateToken(args) => Request::RegenerateToken {
                organization,
                robot: args.robot,
            },
            Self::CreatePrototype(args) => Request::CreatePrototype {
                organization,
                user: args.user,
                team: args.team,
            },
            Self::CreateTeam(args) => Request::CreateTeam {
                organization,
                team: args.team,
                role: args.role,
            },
            Self::AddMember(args) => Request::AddMember {
                organization,
                team: args.team,
                user: args.user,
            },
        }
    }
}

/// Returns true for requests the registry only answers with credentials.
pub const fn requires_token(request: &Request) -> bool {
    matches!(
        request,
        Request::SetVisibility { .. } | Request::ListImages { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaytool_core::{Repository, TeamRole, Visibility};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "quaytool",
            "set-visibility",
            "--api-url",
            "https://quay.example.com/api/v1",
            "--organization",
            "acme",
            "--visibility",
            "private",
            "--insecure",
            "--output",
            "json",
        ]);

        assert_eq!(
            cli.global.api_url.as_deref(),
            Some("https://quay.example.com/api/v1")
        );
        assert!(cli.global.insecure);
        assert_eq!(cli.global.output, OutputFormat::Json);
        assert_eq!(cli.global.timeout, 30);

        let request = cli.command.into_request(cli.global.organization);
        match request {
            Request::SetVisibility { scope, visibility } => {
                assert_eq!(scope.organization.as_deref(), Some("acme"));
                assert_eq!(visibility, Some(Visibility::Private));
                assert!(scope.selector.is_unfiltered());
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_repeatable_repository_filters() {
        let cli = parse(&[
            "quaytool",
            "--organization",
            "acme",
            "restore-tag",
            "--tag",
            "latest",
            "--repository",
            "a",
            "--repository",
            "b",
            "--skip-repo",
            "b",
        ]);

        let Request::RestoreTag { scope, tag } = cli.command.into_request(cli.global.organization)
        else {
            panic!("expected restore-tag");
        };
        assert_eq!(tag.as_deref(), Some("latest"));
        assert!(scope.selector.admits(&Repository::new("acme", "a")));
        assert!(!scope.selector.admits(&Repository::new("acme", "b")));
    }

    #[test]
    fn test_expire_accepts_negative_days() {
        let cli = parse(&["quaytool", "expire-tag", "--tag", "v1", "--days", "-1"]);
        let Request::ExpireTag { days, .. } = cli.command.into_request(None) else {
            panic!("expected expire-tag");
        };
        assert_eq!(days, -1);
    }

    #[test]
    fn test_expire_requires_days() {
        assert!(Cli::try_parse_from(["quaytool", "expire-tag", "--tag", "v1"]).is_err());
    }

    #[test]
    fn test_team_role_default_and_override() {
        let cli = parse(&["quaytool", "create-team", "--team", "devs"]);
        let Request::CreateTeam { role, .. } = cli.command.into_request(None) else {
            panic!("expected create-team");
        };
        assert_eq!(role, TeamRole::Creator);

        let cli = parse(&["quaytool", "create-team", "--team", "devs", "--role", "admin"]);
        let Request::CreateTeam { role, .. } = cli.command.into_request(None) else {
            panic!("expected create-team");
        };
        assert_eq!(role, TeamRole::Admin);
    }

    #[test]
    fn test_invalid_visibility_rejected() {
        let parsed = Cli::try_parse_from(["quaytool", "set-visibility", "--visibility", "hidden"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["quaytool", "--timeout", "0", "info"]).is_err());
        assert_eq!(parse(&["quaytool", "--timeout", "5", "info"]).global.timeout, 5);
    }

    #[test]
    fn test_token_requirement() {
        let cli = parse(&["quaytool", "list-images", "--repository", "web"]);
        assert!(requires_token(&cli.command.into_request(None)));

        let cli = parse(&["quaytool", "list-robots"]);
        assert!(!requires_token(&cli.command.into_request(None)));
    }
}

//! Organization-scoped commands: robots, teams and prototypes.

use clap::Args;
use quaytool_core::TeamRole;

/// Arguments for robot commands.
#[derive(Args, Debug)]
pub struct RobotArgs {
    /// Robot name, without the organization prefix
    #[arg(long)]
    pub robot: Option<String>,
}

/// Arguments for the create-team command.
#[derive(Args, Debug)]
pub struct TeamArgs {
    /// Team name
    #[arg(long)]
    pub team: Option<String>,

    /// Organization role of the team (member, creator, admin)
    #[arg(long, default_value = "creator")]
    pub role: TeamRole,
}

/// Arguments for the add-member command.
#[derive(Args, Debug)]
pub struct MemberArgs {
    /// Team name
    #[arg(long)]
    pub team: Option<String>,

    /// User to add
    #[arg(long)]
    pub user: Option<String>,
}

/// Arguments for the create-prototype command.
///
/// When both are given the team receives the permission.
#[derive(Args, Debug)]
pub struct PrototypeArgs {
    /// User receiving write on new repositories
    #[arg(long)]
    pub user: Option<String>,

    /// Team receiving write on new repositories
    #[arg(long)]
    pub team: Option<String>,
}

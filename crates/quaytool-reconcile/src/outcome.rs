//! Per-item outcomes and batch accounting.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Mutating actions the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Set every selected repository public or private.
    SetVisibility,
    /// Grant a user write on every selected repository.
    GrantWritePermission,
    /// Set or clear a tag's expiration across repositories.
    ExpireTag,
    /// Point a tag back at its current manifest digest.
    RestoreTag,
    /// Create repositories by name.
    CreateRepository,
    /// Create an organization.
    CreateOrganization,
    /// Create a robot account.
    CreateRobot,
    /// Create a team.
    CreateTeam,
    /// Add a user to a team.
    AddTeamMember,
    /// Create a default-permission prototype.
    CreatePrototype,
}

impl Action {
    /// Returns the action name as shown to operators.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetVisibility => "set-visibility",
            Self::GrantWritePermission => "grant-write-permission",
            Self::ExpireTag => "expire-tag",
            Self::RestoreTag => "restore-tag",
            Self::CreateRepository => "create-repository",
            Self::CreateOrganization => "create-organization",
            Self::CreateRobot => "create-robot",
            Self::CreateTeam => "create-team",
            Self::AddTeamMember => "add-team-member",
            Self::CreatePrototype => "create-prototype",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    /// The registry accepted the change.
    Applied {
        /// Response payload worth showing (robot credentials, for instance).
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<Value>,
    },

    /// The resource was already present; nothing was sent.
    AlreadyExists,

    /// The target is in the requested state as far as this action goes;
    /// nothing was sent.
    Unchanged {
        /// Why nothing was sent.
        reason: String,
    },

    /// The item was passed over without a change.
    Skipped {
        /// Why the item was passed over.
        reason: String,
    },

    /// The registry rejected the change or could not be reached.
    Failed {
        /// Error message.
        message: String,
    },
}

impl Outcome {
    /// A successful change without a payload.
    pub const fn applied() -> Self {
        Self::Applied { detail: None }
    }

    /// An item left as it was.
    pub fn unchanged(reason: impl Into<String>) -> Self {
        Self::Unchanged {
            reason: reason.into(),
        }
    }

    /// A skipped item.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// A failed item.
    pub fn failed(message: impl fmt::Display) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }

    /// Returns true for a failed item.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome for a single target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    /// Repository path or resource key.
    pub target: String,

    /// What happened.
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Result of one batch action.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Unique run ID.
    pub run_id: String,

    /// Action that ran.
    pub action: Action,

    /// Number of items changed.
    pub applied: usize,

    /// Number of items found already in place.
    pub already_present: usize,

    /// Number of items left as they were.
    pub unchanged: usize,

    /// Number of items passed over.
    pub skipped: usize,

    /// Number of items that failed.
    pub failed: usize,

    /// Per-item outcomes in processing order.
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Starts an empty report with a fresh run ID.
    pub fn new(action: Action) -> Self {
        Self::with_run_id(action, uuid::Uuid::now_v7().to_string())
    }

    /// Starts an empty report under an existing run ID.
    pub fn with_run_id(action: Action, run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            action,
            applied: 0,
            already_present: 0,
            unchanged: 0,
            skipped: 0,
            failed: 0,
            items: Vec::new(),
        }
    }

    /// Creates a report from individual outcomes.
    pub fn from_results(action: Action, run_id: &str, results: Vec<ItemOutcome>) -> Self {
        let mut report = Self::with_run_id(action, run_id);
        for item in results {
            report.push(item);
        }
        report
    }

    /// Records the outcome for `target`.
    pub fn record(&mut self, target: impl Into<String>, outcome: Outcome) {
        self.push(ItemOutcome {
            target: target.into(),
            outcome,
        });
    }

    fn push(&mut self, item: ItemOutcome) {
        match item.outcome {
            Outcome::Applied { .. } => self.applied += 1,
            Outcome::AlreadyExists => self.already_present += 1,
            Outcome::Unchanged { .. } => self.unchanged += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(item);
    }

    /// Returns true if no item failed.
    pub const fn is_fully_successful(&self) -> bool {
        self.failed == 0
    }

    /// Number of items processed.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was processed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct skipped targets, sorted.
    pub fn skipped_targets(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, Outcome::Skipped { .. }))
            .map(|item| item.target.as_str())
            .collect()
    }

    /// Failed items.
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|item| item.outcome.is_failure())
    }

    /// Looks up the outcome for `target`.
    pub fn outcome_for(&self, target: &str) -> Option<&Outcome> {
        self.items
            .iter()
            .find(|item| item.target == target)
            .map(|item| &item.outcome)
    }
}

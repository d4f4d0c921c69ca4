//! Pipeline outcome type definitions
//!
//! Supporting types for resolution and confirmation telemetry.

use serde::{Deserialize, Serialize};

/// Which of the four resolution outcomes a backend produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OutcomeKind {
    Single,
    Bundle,
    NoMatch,
    Failed,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Single => write!(f, "Single"),
            OutcomeKind::Bundle => write!(f, "Bundle"),
            OutcomeKind::NoMatch => write!(f, "NoMatch"),
            OutcomeKind::Failed => write!(f, "Failed"),
        }
    }
}

/// How a confirmation prompt was retired
///
/// Declined and TimedOut have the same effect on the queue (the attached
/// bundle is discarded); they are kept apart for telemetry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConfirmationOutcome {
    Expanded,
    Declined,
    TimedOut,
}

impl ConfirmationOutcome {
    /// True when the attached bundle should be loaded
    pub fn expands(self) -> bool {
        matches!(self, ConfirmationOutcome::Expanded)
    }
}

impl std::fmt::Display for ConfirmationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationOutcome::Expanded => write!(f, "Expanded"),
            ConfirmationOutcome::Declined => write!(f, "Declined"),
            ConfirmationOutcome::TimedOut => write!(f, "TimedOut"),
        }
    }
}

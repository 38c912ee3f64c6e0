//! Step status state machine.

use serde::{Deserialize, Serialize};

/// A status with a fixed set of allowed moves.
pub trait FlowState:
    Clone + PartialEq + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static
{
    /// Nothing more happens to work in this status.
    fn is_terminal(&self) -> bool;

    /// Unrestricted unless overridden.
    fn can_transition_to(&self, _target: &Self) -> bool {
        true
    }
}

/// Lifecycle of a single execution step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Planned, never executed
    Pending,
    /// Currently being resolved or dispatched
    InProgress,
    /// The API call succeeded and its result is stored
    Completed,
    /// Resolution or dispatch failed; retry is caller-driven
    Failed,
    /// Waiting for the caller to supply missing parameters
    NeedsClarification,
}

impl StepStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::NeedsClarification => "needs_clarification",
        }
    }

    /// True when the step may be (re-)entered by `execute_step`.
    pub fn is_runnable(&self) -> bool {
        matches!(
            self,
            StepStatus::Pending | StepStatus::Failed | StepStatus::NeedsClarification
        )
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FlowState for StepStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed)
    }

    fn can_transition_to(&self, target: &Self) -> bool {
        match (self, target) {
            (StepStatus::Completed, _) => false,
            (
                StepStatus::Pending | StepStatus::Failed | StepStatus::NeedsClarification,
                StepStatus::InProgress,
            ) => true,
            (
                StepStatus::InProgress,
                StepStatus::Completed | StepStatus::Failed | StepStatus::NeedsClarification,
            ) => true,
            _ => false,
        }
    }
}

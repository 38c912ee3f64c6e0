//! Results of plan creation and step execution.

use intentflow_agent::IntentExtraction;
use intentflow_core::{registry::ParameterSpec, session::ExecutionStep};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

/// Message returned once the cursor has passed the last step
pub const ALL_STEPS_COMPLETED: &str = "All steps completed";

/// A freshly created plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionPlan {
    pub session_id: String,
    pub plan: Vec<ExecutionStep>,
}

/// Outcome of `process_intent`
///
/// Serializes with `status` `plan_created` or `no_intention`, carrying the
/// raw extraction either way.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    PlanCreated {
        plan: ExecutionPlan,
        extraction: IntentExtraction,
    },
    NoIntention { extraction: IntentExtraction },
}

impl IntentOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::PlanCreated { .. } => "plan_created",
            Self::NoIntention { .. } => "no_intention",
        }
    }

    pub fn plan(&self) -> Option<&ExecutionPlan> {
        match self {
            Self::PlanCreated { plan, .. } => Some(plan),
            Self::NoIntention { .. } => None,
        }
    }

    pub fn extraction(&self) -> &IntentExtraction {
        match self {
            Self::PlanCreated { extraction, .. } | Self::NoIntention { extraction } => extraction,
        }
    }
}

impl Serialize for IntentOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", self.status())?;
        match self {
            Self::PlanCreated { plan, extraction } => {
                map.serialize_entry("session_id", &plan.session_id)?;
                map.serialize_entry("plan", &plan.plan)?;
                map.serialize_entry("message", "Plan created successfully")?;
                map.serialize_entry("extraction", extraction)?;
            }
            Self::NoIntention { extraction } => {
                map.serialize_entry("message", "No API actions detected in the request")?;
                map.serialize_entry("extraction", extraction)?;
            }
        }
        map.end()
    }
}

/// Outcome of `execute_step` and `provide_clarification`
///
/// Serializes to the wire shape keyed by `status`: `completed`,
/// `needs_clarification` or `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step ran, or had already run, and its result is available
    Completed {
        step_id: String,
        result: Value,
        next_step_id: Option<String>,
        plan: Vec<ExecutionStep>,
    },
    /// The cursor is past the last step
    AllCompleted,
    /// Required parameters are still missing
    NeedsClarification {
        step_id: String,
        questions: String,
        missing_params: Vec<ParameterSpec>,
        plan: Vec<ExecutionStep>,
    },
    /// Resolution or dispatch failed; the step may be retried
    Failed {
        step_id: String,
        error: String,
        suggestion: Option<String>,
        plan: Vec<ExecutionStep>,
    },
    /// Unknown session or step
    Rejected { error: String },
}

impl StepOutcome {
    pub fn rejected(error: impl ToString) -> Self {
        Self::Rejected {
            error: error.to_string(),
        }
    }

    /// Wire status
    pub fn status(&self) -> &'static str {
        match self {
            Self::Completed { .. } | Self::AllCompleted => "completed",
            Self::NeedsClarification { .. } => "needs_clarification",
            Self::Failed { .. } | Self::Rejected { .. } => "error",
        }
    }

    pub fn step_id(&self) -> Option<&str> {
        match self {
            Self::Completed { step_id, .. }
            | Self::NeedsClarification { step_id, .. }
            | Self::Failed { step_id, .. } => Some(step_id),
            Self::AllCompleted | Self::Rejected { .. } => None,
        }
    }

    pub fn plan(&self) -> Option<&[ExecutionStep]> {
        match self {
            Self::Completed { plan, .. }
            | Self::NeedsClarification { plan, .. }
            | Self::Failed { plan, .. } => Some(plan),
            Self::AllCompleted | Self::Rejected { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } | Self::Rejected { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::AllCompleted)
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for StepOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", self.status())?;
        match self {
            Self::Completed {
                step_id,
                result,
                next_step_id,
                plan,
            } => {
                map.serialize_entry("step_id", step_id)?;
                map.serialize_entry("result", result)?;
                map.serialize_entry("plan", plan)?;
                map.serialize_entry("next_step_id", next_step_id)?;
            }
            Self::AllCompleted => {
                map.serialize_entry("message", ALL_STEPS_COMPLETED)?;
            }
            Self::NeedsClarification {
                step_id,
                questions,
                missing_params,
                plan,
            } => {
                map.serialize_entry("step_id", step_id)?;
                map.serialize_entry("questions", questions)?;
                map.serialize_entry("missing_params", missing_params)?;
                map.serialize_entry("plan", plan)?;
            }
            Self::Failed {
                step_id,
                error,
                suggestion,
                plan,
            } => {
                map.serialize_entry("step_id", step_id)?;
                map.serialize_entry("error", error)?;
                if let Some(suggestion) = suggestion {
                    map.serialize_entry("suggestion", suggestion)?;
                }
                map.serialize_entry("plan", plan)?;
            }
            Self::Rejected { error } => {
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

//! Execution steps and sessions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{
    error::{FlowError, Result},
    registry::{ApiEntry, ParameterSpec},
    state::{FlowState, StepStatus},
    workflow::{ApiRef, WorkflowStep},
};

/// Reasoning recorded when the workflow step carried none.
pub const DEFAULT_REASONING: &str = "No reasoning provided";

/// A planned API call tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id: String,
    pub software: String,
    pub api: ApiRef,
    pub parameters: Map<String, Value>,
    pub reasoning: String,
    pub status: StepStatus,
    pub required_parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStep {
    /// Enrich a workflow step with its registry entry. `position` is 1-based.
    pub fn from_workflow(position: usize, step: &WorkflowStep, api: &ApiEntry) -> Self {
        Self {
            id: format!("step_{position}"),
            software: step.software.clone(),
            api: ApiRef::new(api.name.clone(), api.description.clone()),
            parameters: step.parameters.clone(),
            reasoning: step
                .reasoning
                .clone()
                .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
            status: StepStatus::Pending,
            required_parameters: api.required_parameters(),
            error: None,
        }
    }

    /// Move to `target`, rejecting transitions the state machine forbids.
    pub fn transition(&mut self, target: StepStatus) -> Result<()> {
        if !self.status.can_transition_to(&target) {
            return Err(FlowError::invalid_transition(self.status, target));
        }
        self.status = target;
        if target != StepStatus::Failed {
            self.error = None;
        }
        Ok(())
    }

    /// Mark the step failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(StepStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    /// Merge `updates` into the parameters, overwriting existing keys.
    pub fn merge_parameters(&mut self, updates: &Map<String, Value>) {
        for (key, value) in updates {
            self.parameters.insert(key.clone(), value.clone());
        }
    }

    /// Required parameter specs that are absent or null in `resolved`.
    pub fn missing_parameters(&self, resolved: &Map<String, Value>) -> Vec<ParameterSpec> {
        self.required_parameters
            .iter()
            .filter(|spec| resolved.get(&spec.name).is_none_or(Value::is_null))
            .cloned()
            .collect()
    }
}

/// Per-workflow execution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSession {
    pub session_id: String,
    pub workflow: Vec<WorkflowStep>,
    pub plan: Vec<ExecutionStep>,
    pub results: Map<String, Value>,
    pub current_step_index: usize,
    pub user_context: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionSession {
    pub fn new(
        session_id: impl Into<String>,
        workflow: Vec<WorkflowStep>,
        plan: Vec<ExecutionStep>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            workflow,
            plan,
            results: Map::new(),
            current_step_index: 0,
            user_context: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.plan.iter().position(|step| step.id == step_id)
    }

    pub fn step(&self, step_id: &str) -> Option<&ExecutionStep> {
        self.plan.iter().find(|step| step.id == step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut ExecutionStep> {
        self.plan.iter_mut().find(|step| step.id == step_id)
    }

    /// The step under the cursor, if the plan is not exhausted.
    pub fn current_step(&self) -> Option<&ExecutionStep> {
        self.plan.get(self.current_step_index)
    }

    /// Record a successful call for the step at `index`.
    ///
    /// Stores `results[step_id]`, marks the step completed and moves the
    /// cursor forward by one when the step is the one under the cursor.
    pub fn complete_step(&mut self, index: usize, result: Value) -> Result<()> {
        let step = self
            .plan
            .get_mut(index)
            .ok_or_else(|| FlowError::construction(format!("no step at position {index}")))?;
        step.transition(StepStatus::Completed)?;
        self.results.insert(
            step.id.clone(),
            json!({ "status": "completed", "result": result }),
        );
        if index == self.current_step_index {
            self.current_step_index += 1;
        }
        Ok(())
    }

    /// The stored call result for a completed step.
    pub fn result_of(&self, step_id: &str) -> Option<&Value> {
        self.results.get(step_id).and_then(|record| record.get("result"))
    }

    /// First step at or after the cursor that has not completed.
    pub fn next_step_id(&self) -> Option<String> {
        self.plan
            .iter()
            .skip(self.current_step_index)
            .find(|step| step.status != StepStatus::Completed)
            .map(|step| step.id.clone())
    }

    /// The session as a JSON tree, the root that references walk from.
    pub fn state_tree(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

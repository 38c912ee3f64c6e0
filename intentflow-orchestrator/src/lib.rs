//! # IntentFlow Orchestrator
//!
//! Turns an extracted workflow into a stateful, resumable execution
//! session. Each call to [`Orchestrator::execute_step`] resolves the step's
//! parameter references, pauses for clarification when required parameters
//! are missing, dispatches the API call and records the outcome.
//!
//! ## Example
//!
//! ```rust
//! use intentflow_core::prelude::*;
//! use intentflow_orchestrator::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = ApiRegistry::from_json_str(r#"[{
//!         "name": "Calendar", "description": "Calendar app",
//!         "apis": [{"name": "AddEvent", "description": "Add an event",
//!                   "parameters": [{"name": "title", "required": true}]}]
//!     }]"#).unwrap();
//!
//!     let orchestrator = Orchestrator::builder(registry).build().await;
//!     let workflow = vec![WorkflowStep::new("Calendar", "AddEvent")];
//!     let plan = orchestrator.create_execution_plan(workflow, None).await;
//!
//!     let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
//!     assert_eq!(outcome.status(), "needs_clarification");
//!
//!     let answers = json!({"title": "Standup"}).as_object().cloned().unwrap();
//!     let outcome = orchestrator
//!         .provide_clarification(&plan.session_id, "step_1", answers)
//!         .await;
//!     assert!(outcome.is_completed());
//! }
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod store;

#[cfg(test)]
mod orchestrator_test;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use outcome::{ExecutionPlan, IntentOutcome, StepOutcome};
pub use store::{SessionHandle, SessionStore};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        config::OrchestratorConfig,
        error::{OrchestratorError, Result},
        orchestrator::{Orchestrator, OrchestratorBuilder},
        outcome::{ExecutionPlan, IntentOutcome, StepOutcome},
    };
}

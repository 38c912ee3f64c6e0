//! # IntentFlow Core
//!
//! Data model for executing LLM-extracted API workflows step by step.
//!
//! ## Core Concepts
//!
//! - **Registry**: the catalogue of software, APIs and their parameter specs
//! - **Workflow**: the abstract list of API calls a user asked for
//! - **Session**: a stateful plan built from a workflow, with per-step status,
//!   accumulated results and a cursor
//! - **Reference**: a `{dotted.path[0]}` parameter value that pulls data from
//!   earlier results in the same session
//!
//! ## Quick Start
//!
//! ```rust
//! use intentflow_core::prelude::*;
//! use serde_json::json;
//!
//! let registry = ApiRegistry::from_json_str(r#"[{
//!     "name": "Email", "description": "Mail",
//!     "apis": [{"name": "SendEmail", "description": "Send",
//!               "parameters": [{"name": "to", "required": true}]}]
//! }]"#).unwrap();
//!
//! let workflow = WorkflowStep::new("Email", "SendEmail").with_parameter("to", json!("a@b.c"));
//! let api = registry.find_api("Email", "SendEmail").unwrap();
//! let step = ExecutionStep::from_workflow(1, &workflow, api);
//! assert_eq!(step.id, "step_1");
//! assert_eq!(step.status, StepStatus::Pending);
//! ```

pub mod error;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod state;
pub mod workflow;

/// Convenient re-exports for common use.
pub mod prelude {
    pub use serde::{Deserialize, Serialize};

    pub use crate::{
        error::{FlowError, Result},
        reference::{PathSegment, Reference},
        registry::{ApiEntry, ApiRegistry, ParameterSpec, SoftwareEntry},
        resolver::ParameterResolver,
        session::{ExecutionSession, ExecutionStep},
        state::{FlowState, StepStatus},
        workflow::{ApiRef, WorkflowStep},
    };
}

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use intentflow_agent::{AgentError, ChatTurn, LanguageModel};
use intentflow_core::{prelude::*, session::DEFAULT_REASONING};
use intentflow_tools::{ApiHandler, ApiParameters, ToolError, custom::FnHandler};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use tracing_test::traced_test;

use crate::{
    config::OrchestratorConfig, error::OrchestratorError, orchestrator::Orchestrator,
    outcome::StepOutcome,
};

const REGISTRY: &str = r#"[
  {
    "name": "Email",
    "description": "Mail client",
    "apis": [{
      "name": "SendEmail",
      "description": "Send an email",
      "parameters": [
        {"name": "to", "type": "string", "required": true, "description": "Recipient"},
        {"name": "subject", "type": "string", "required": true, "description": "Subject line"},
        {"name": "body", "type": "string", "description": "Message body"}
      ]
    }]
  },
  {
    "name": "Search",
    "description": "Search engine",
    "apis": [{
      "name": "Find",
      "description": "Find items",
      "parameters": [{"name": "query", "required": true, "description": "Search terms"}]
    }]
  },
  {
    "name": "Calendar",
    "description": "Calendar app",
    "apis": [{"name": "AddEvent", "description": "Add an event", "parameters": []}]
  }
]"#;

struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str, _history: &[ChatTurn]) -> intentflow_agent::Result<String> {
        Err(AgentError::model("model unavailable"))
    }
}

/// Counts calls and echoes its parameters back
fn echo(software: &str, api: &str, calls: Arc<AtomicUsize>) -> Arc<dyn ApiHandler> {
    Arc::new(FnHandler::new(software, api, move |params: ApiParameters| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Value::from(params))
    }))
}

fn search(calls: Arc<AtomicUsize>) -> Arc<dyn ApiHandler> {
    Arc::new(FnHandler::new("Search", "Find", move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"items": ["a", "b", "c"]}))
    }))
}

fn registry() -> ApiRegistry {
    ApiRegistry::from_json_str(REGISTRY).unwrap()
}

fn email(to: Option<&str>, subject: Option<&str>) -> WorkflowStep {
    let mut step = WorkflowStep::new("Email", "SendEmail").with_reasoning("User asked to mail");
    if let Some(to) = to {
        step = step.with_parameter("to", json!(to));
    }
    if let Some(subject) = subject {
        step = step.with_parameter("subject", json!(subject));
    }
    step
}

fn map(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

async fn cursor(orchestrator: &Orchestrator, session_id: &str) -> usize {
    orchestrator
        .session(session_id)
        .await
        .unwrap()
        .current_step_index
}

#[tokio::test]
#[traced_test]
async fn plan_has_one_step_per_known_api() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    let workflow = vec![
        email(Some("bob@example.com"), None),
        WorkflowStep::new("Fax", "Send"),
        WorkflowStep::new("Search", "Find").with_parameter("query", json!("rust")),
    ];

    let plan = orchestrator.create_execution_plan(workflow, None).await;

    assert!(plan.session_id.starts_with("session_"));
    let ids: Vec<_> = plan.plan.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["step_1", "step_2"]);
    assert_eq!(plan.plan[0].software, "Email");
    assert_eq!(plan.plan[0].api.description, "Send an email");
    assert_eq!(plan.plan[0].reasoning, "User asked to mail");
    assert_eq!(plan.plan[0].required_parameters.len(), 2);
    assert_eq!(plan.plan[1].reasoning, DEFAULT_REASONING);
    assert!(plan.plan.iter().all(|s| s.status == StepStatus::Pending));
    assert!(logs_contain("API not found, skipping workflow step"));

    let session = orchestrator.session(&plan.session_id).await.unwrap();
    assert_eq!(session.workflow.len(), 3);
    assert_eq!(session.current_step_index, 0);
}

#[tokio::test]
async fn explicit_session_id_overwrites_existing_session() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    orchestrator
        .create_execution_plan(vec![email(None, None)], Some("chat-1".into()))
        .await;
    let plan = orchestrator
        .create_execution_plan(
            vec![WorkflowStep::new("Calendar", "AddEvent"), email(None, None)],
            Some("chat-1".into()),
        )
        .await;

    assert_eq!(plan.session_id, "chat-1");
    assert_eq!(orchestrator.session_count().await, 1);
    let session = orchestrator.session("chat-1").await.unwrap();
    assert_eq!(session.plan.len(), 2);
    assert_eq!(session.plan[0].software, "Calendar");
}

#[tokio::test]
async fn step_without_references_is_dispatched_as_is() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(echo("Email", "SendEmail", calls.clone()))
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(vec![email(Some("bob@example.com"), Some("Hi"))], None)
        .await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;

    let StepOutcome::Completed {
        step_id,
        result,
        next_step_id,
        ..
    } = outcome
    else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(step_id, "step_1");
    assert_eq!(result, json!({"to": "bob@example.com", "subject": "Hi"}));
    assert_eq!(next_step_id, None);

    let session = orchestrator.session(&plan.session_id).await.unwrap();
    assert_eq!(
        session.results["step_1"],
        json!({"status": "completed", "result": {"to": "bob@example.com", "subject": "Hi"}})
    );
    assert_eq!(session.current_step_index, 1);
}

#[tokio::test]
async fn references_pull_from_earlier_results() {
    let search_calls = Arc::new(AtomicUsize::new(0));
    let email_calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(search(search_calls.clone()))
        .with_handler(echo("Email", "SendEmail", email_calls.clone()))
        .build()
        .await;
    let workflow = vec![
        WorkflowStep::new("Search", "Find").with_parameter("query", json!("letters")),
        email(Some("bob@example.com"), Some("{results.step_1.result.items[1]}")),
    ];
    let plan = orchestrator.create_execution_plan(workflow, None).await;

    let first = orchestrator.execute_step(&plan.session_id, None, None).await;
    let StepOutcome::Completed { next_step_id, .. } = &first else {
        panic!("expected completion, got {first:?}");
    };
    assert_eq!(next_step_id.as_deref(), Some("step_2"));

    let second = orchestrator.execute_step(&plan.session_id, None, None).await;
    let StepOutcome::Completed { result, .. } = second else {
        panic!("expected completion, got {second:?}");
    };
    assert_eq!(result["subject"], json!("b"));
    assert_eq!(email_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn out_of_range_reference_fails_the_step() {
    let email_calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(search(Arc::new(AtomicUsize::new(0))))
        .with_handler(echo("Email", "SendEmail", email_calls.clone()))
        .build()
        .await;
    let workflow = vec![
        WorkflowStep::new("Search", "Find").with_parameter("query", json!("letters")),
        email(Some("bob@example.com"), Some("{results.step_1.result.items[5]}")),
    ];
    let plan = orchestrator.create_execution_plan(workflow, None).await;
    orchestrator.execute_step(&plan.session_id, None, None).await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;

    let StepOutcome::Failed {
        step_id,
        error,
        suggestion,
        plan: steps,
    } = outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(step_id, "step_2");
    assert!(error.contains("{results.step_1.result.items[5]}"));
    assert_eq!(suggestion, None);
    assert_eq!(steps[1].status, StepStatus::Failed);
    assert!(
        steps[1]
            .error
            .as_deref()
            .unwrap()
            .starts_with("Parameter resolution error: ")
    );
    assert_eq!(cursor(&orchestrator, &plan.session_id).await, 1);
    assert_eq!(email_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_parameter_asks_for_clarification_then_resumes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(echo("Email", "SendEmail", calls.clone()))
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(vec![email(Some("bob@example.com"), None)], None)
        .await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
    let StepOutcome::NeedsClarification {
        step_id,
        questions,
        missing_params,
        plan: steps,
    } = outcome
    else {
        panic!("expected clarification, got {outcome:?}");
    };
    assert_eq!(step_id, "step_1");
    assert_eq!(missing_params.len(), 1);
    assert_eq!(missing_params[0].name, "subject");
    assert_eq!(questions, "Please provide the subject (Subject line)");
    assert_eq!(steps[0].status, StepStatus::NeedsClarification);
    assert_eq!(cursor(&orchestrator, &plan.session_id).await, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let outcome = orchestrator
        .provide_clarification(&plan.session_id, "step_1", map(json!({"subject": "Lunch"})))
        .await;
    let StepOutcome::Completed { result, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(result["subject"], json!("Lunch"));

    let session = orchestrator.session(&plan.session_id).await.unwrap();
    assert_eq!(session.current_step_index, 1);
    assert_eq!(session.plan[0].status, StepStatus::Completed);
    assert_eq!(session.result_of("step_1"), Some(&result));
}

#[tokio::test]
async fn null_required_parameter_counts_as_missing() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    let step = email(Some("bob@example.com"), None).with_parameter("subject", Value::Null);
    let plan = orchestrator.create_execution_plan(vec![step], None).await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
    assert_eq!(outcome.status(), "needs_clarification");
}

#[tokio::test]
async fn completed_step_is_not_dispatched_again() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(echo("Email", "SendEmail", calls.clone()))
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(
            vec![
                email(Some("a@example.com"), Some("One")),
                email(Some("b@example.com"), Some("Two")),
            ],
            None,
        )
        .await;
    orchestrator.execute_step(&plan.session_id, None, None).await;

    let again = orchestrator
        .execute_step(&plan.session_id, Some("step_1"), None)
        .await;

    let StepOutcome::Completed {
        result,
        next_step_id,
        ..
    } = again
    else {
        panic!("expected stored result, got {again:?}");
    };
    assert_eq!(result["subject"], json!("One"));
    assert_eq!(next_step_id.as_deref(), Some("step_2"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cursor(&orchestrator, &plan.session_id).await, 1);
}

#[tokio::test]
async fn out_of_order_completion_is_not_repeated_by_the_cursor() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(echo("Email", "SendEmail", calls.clone()))
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(
            vec![
                email(Some("a@example.com"), Some("One")),
                email(Some("b@example.com"), Some("Two")),
            ],
            None,
        )
        .await;
    let id = plan.session_id.as_str();

    let second = orchestrator.execute_step(id, Some("step_2"), None).await;
    assert!(second.is_completed());
    assert_eq!(cursor(&orchestrator, id).await, 0);

    let first = orchestrator.execute_step(id, None, None).await;
    assert_eq!(first.step_id(), Some("step_1"));
    assert_eq!(cursor(&orchestrator, id).await, 1);

    let landed = orchestrator.execute_step(id, None, None).await;
    assert_eq!(landed.step_id(), Some("step_2"));
    assert_eq!(cursor(&orchestrator, id).await, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert_eq!(
        orchestrator.execute_step(id, None, None).await,
        StepOutcome::AllCompleted
    );
}

#[tokio::test]
#[traced_test]
async fn dispatch_failure_keeps_cursor_and_suggests_a_fix() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let flaky = FnHandler::new("Email", "SendEmail", move |params: ApiParameters| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ToolError::http(500, "mail server down"));
        }
        Ok(Value::from(params))
    });
    let orchestrator = Orchestrator::builder(registry())
        .with_model(Arc::new(FailingModel))
        .with_handler(Arc::new(flaky))
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(vec![email(Some("bob@example.com"), Some("Hi"))], None)
        .await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
    let StepOutcome::Failed {
        error,
        suggestion,
        plan: steps,
        ..
    } = outcome
    else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(error, "API returned error 500: mail server down");
    assert_eq!(
        suggestion.as_deref(),
        Some(
            "There was an error: API returned error 500: mail server down. Please check your parameters and try again."
        )
    );
    assert_eq!(steps[0].status, StepStatus::Failed);
    assert_eq!(steps[0].error.as_deref(), Some(error.as_str()));
    assert_eq!(cursor(&orchestrator, &plan.session_id).await, 0);
    assert!(logs_contain("API call failed"));

    let retry = orchestrator.execute_step(&plan.session_id, None, None).await;
    assert!(retry.is_completed());
    let session = orchestrator.session(&plan.session_id).await.unwrap();
    assert_eq!(session.plan[0].error, None);
    assert_eq!(session.current_step_index, 1);
}

#[tokio::test]
async fn unknown_session_and_step_are_rejected() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    assert_eq!(
        orchestrator.execute_step("nope", None, None).await,
        StepOutcome::rejected("Session not found: nope")
    );
    assert_eq!(
        orchestrator
            .provide_clarification("nope", "step_1", Map::new())
            .await
            .error(),
        Some("Session not found: nope")
    );

    let plan = orchestrator
        .create_execution_plan(vec![email(None, None)], None)
        .await;
    assert_eq!(
        orchestrator
            .execute_step(&plan.session_id, Some("step_9"), None)
            .await
            .error(),
        Some("Step step_9 not found")
    );
    assert_eq!(
        orchestrator
            .provide_clarification(&plan.session_id, "step_9", Map::new())
            .await
            .error(),
        Some("Step step_9 not found")
    );
}

#[tokio::test]
async fn empty_plan_reports_all_steps_completed() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    let plan = orchestrator
        .create_execution_plan(vec![WorkflowStep::new("Fax", "Send")], None)
        .await;
    assert!(plan.plan.is_empty());

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
    assert_eq!(
        outcome.to_json().unwrap(),
        json!({"status": "completed", "message": "All steps completed"})
    );
}

#[tokio::test]
async fn additional_context_is_recorded_and_merged() {
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(echo("Email", "SendEmail", Arc::new(AtomicUsize::new(0))))
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(vec![email(Some("bob@example.com"), Some("Draft"))], None)
        .await;
    let context = json!({"note": "make it formal", "parameters": {"subject": "Final"}});

    let outcome = orchestrator
        .execute_step(&plan.session_id, None, Some(context.clone()))
        .await;

    let StepOutcome::Completed { result, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(result["subject"], json!("Final"));
    let session = orchestrator.session(&plan.session_id).await.unwrap();
    assert_eq!(session.user_context["step_1"], context);
    assert_eq!(session.plan[0].parameters["subject"], json!("Final"));
}

#[tokio::test]
async fn user_context_is_addressable_by_references() {
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(echo("Email", "SendEmail", Arc::new(AtomicUsize::new(0))))
        .build()
        .await;
    let step = email(Some("bob@example.com"), Some("{user_context.step_1.topic}"));
    let plan = orchestrator.create_execution_plan(vec![step], None).await;

    let outcome = orchestrator
        .execute_step(&plan.session_id, None, Some(json!({"topic": "Quarterly review"})))
        .await;

    let StepOutcome::Completed { result, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(result["subject"], json!("Quarterly review"));
}

#[tokio::test]
async fn unmapped_api_uses_demo_response_by_default() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    let plan = orchestrator
        .create_execution_plan(vec![WorkflowStep::new("Calendar", "AddEvent")], None)
        .await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
    let StepOutcome::Completed { result, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(result["eventId"], json!("E67890"));
}

#[tokio::test]
async fn disabled_demo_fallback_fails_the_step() {
    let config = OrchestratorConfig {
        mock_fallback: false,
        ..OrchestratorConfig::default()
    };
    let orchestrator = Orchestrator::builder(registry())
        .with_config(config)
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(vec![WorkflowStep::new("Calendar", "AddEvent")], None)
        .await;

    let outcome = orchestrator.execute_step(&plan.session_id, None, None).await;
    assert_eq!(outcome.status(), "error");
    assert!(outcome.error().unwrap().contains("Calendar/AddEvent"));
}

#[tokio::test(start_paused = true)]
async fn idle_sessions_expire() {
    let config = OrchestratorConfig {
        session_ttl_secs: 60,
        ..OrchestratorConfig::default()
    };
    let orchestrator = Orchestrator::builder(registry())
        .with_config(config)
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(vec![WorkflowStep::new("Calendar", "AddEvent")], None)
        .await;

    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(
        orchestrator.execute_step(&plan.session_id, None, None).await,
        StepOutcome::rejected(format!("Session not found: {}", plan.session_id))
    );
    assert!(orchestrator.session(&plan.session_id).await.is_none());
}

struct SlowHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl ApiHandler for SlowHandler {
    fn software(&self) -> &str {
        "Calendar"
    }

    fn api(&self) -> &str {
        "AddEvent"
    }

    async fn call(&self, _parameters: ApiParameters) -> intentflow_tools::Result<Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(json!({"call": call}))
    }
}

#[tokio::test(start_paused = true)]
async fn same_session_calls_are_serialized() {
    let handler = Arc::new(SlowHandler {
        calls: AtomicUsize::new(0),
    });
    let orchestrator = Orchestrator::builder(registry())
        .with_handler(handler.clone())
        .build()
        .await;
    let plan = orchestrator
        .create_execution_plan(
            vec![
                WorkflowStep::new("Calendar", "AddEvent"),
                WorkflowStep::new("Calendar", "AddEvent"),
            ],
            None,
        )
        .await;
    let id = plan.session_id.as_str();

    let (a, b) = tokio::join!(
        orchestrator.execute_step(id, None, None),
        orchestrator.execute_step(id, None, None)
    );

    let mut ids = vec![a.step_id().unwrap().to_string(), b.step_id().unwrap().to_string()];
    ids.sort();
    assert_eq!(ids, vec!["step_1", "step_2"]);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cursor(&orchestrator, id).await, 2);
}

#[tokio::test]
async fn intent_extraction_without_model_reports_no_intention() {
    let orchestrator = Orchestrator::builder(registry()).build().await;
    let extraction = orchestrator.extract_intent("mail bob").await;
    assert!(!extraction.has_agent_intention);
    assert!(extraction.reasoning.starts_with("Error calling LLM service: "));
    assert!(extraction.workflow.is_empty());
}

/// Replies with fixed text
struct ScriptedModel(&'static str);

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str, _history: &[ChatTurn]) -> intentflow_agent::Result<String> {
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn process_intent_plans_the_extracted_workflow() {
    let reply = r#"Sure: {
        "hasAgentIntention": true,
        "reasoning": "User wants to mail bob",
        "workflow": [
            {"software": "Email", "api": {"name": "SendEmail", "description": "Send an email"},
             "parameters": {"to": "bob@example.com"}, "reasoning": "mail"},
            {"software": "Fax", "api": {"name": "Send", "description": "Fax it"}}
        ]
    }"#;
    let orchestrator = Orchestrator::builder(registry())
        .with_model(Arc::new(ScriptedModel(reply)))
        .build()
        .await;

    let outcome = orchestrator
        .process_intent("mail bob", Some("session_fixed".into()))
        .await;

    assert_eq!(outcome.status(), "plan_created");
    assert_eq!(outcome.extraction().workflow.len(), 2);
    let plan = outcome.plan().unwrap();
    assert_eq!(plan.session_id, "session_fixed");
    assert_eq!(plan.plan.len(), 1);
    assert_eq!(plan.plan[0].id, "step_1");
    assert!(orchestrator.session("session_fixed").await.is_some());
}

#[tokio::test]
async fn process_intent_without_workflow_creates_no_session() {
    let reply = r#"{"hasAgentIntention": false, "reasoning": "Just chatting", "workflow": []}"#;
    let orchestrator = Orchestrator::builder(registry())
        .with_model(Arc::new(ScriptedModel(reply)))
        .build()
        .await;

    let outcome = orchestrator.process_intent("hello there", None).await;
    assert_eq!(outcome.status(), "no_intention");
    assert_eq!(outcome.extraction().reasoning, "Just chatting");
    assert!(outcome.plan().is_none());
    assert_eq!(orchestrator.session_count().await, 0);

    let failing = Orchestrator::builder(registry())
        .with_model(Arc::new(FailingModel))
        .build()
        .await;
    let outcome = failing.process_intent("mail bob", None).await;
    assert_eq!(outcome.status(), "no_intention");
    assert!(outcome.extraction().reasoning.contains("model unavailable"));
}

#[tokio::test]
async fn from_config_requires_a_registry_path() {
    let err = Orchestrator::from_config(OrchestratorConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Configuration(_)));
    assert!(err.to_string().contains("registry_path"));
}

#[tokio::test]
async fn from_config_loads_the_registry_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api_info.json");
    std::fs::write(&path, REGISTRY).unwrap();

    let config = OrchestratorConfig {
        registry_path: Some(path),
        mock_fallback: false,
        ..OrchestratorConfig::default()
    };
    let orchestrator = Orchestrator::from_config(config).await.unwrap();
    assert_eq!(orchestrator.api_registry().len(), 3);
    assert!(orchestrator.api_registry().find_api("Search", "Find").is_some());

    let empty = dir.path().join("empty.yaml");
    std::fs::write(&empty, "[]\n").unwrap();
    let config = OrchestratorConfig {
        registry_path: Some(empty),
        ..OrchestratorConfig::default()
    };
    let err = Orchestrator::from_config(config).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Flow(FlowError::Construction(_))));
}

//! The orchestrator: plan creation and the step state machine.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use intentflow_agent::{
    ChatHandler, ClarificationGenerator, GenAiModel, IntentExtraction, IntentExtractor,
    LanguageModel,
};
use intentflow_core::{
    error::FlowError,
    registry::ApiRegistry,
    resolver::ParameterResolver,
    session::{ExecutionSession, ExecutionStep},
    state::{FlowState, StepStatus},
    workflow::WorkflowStep,
};
use intentflow_tools::{
    ApiDispatcher, ApiHandler, HandlerRegistry,
    http::HttpTransport,
    search::{GoogleSearchClient, GoogleSearchHandler, YouComClient, YouComHandler},
};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::{
    config::OrchestratorConfig,
    error::{OrchestratorError, Result},
    outcome::{ExecutionPlan, IntentOutcome, StepOutcome},
    store::{SessionHandle, SessionStore},
};

/// Owns the API registry and live sessions, and drives step execution
pub struct Orchestrator {
    registry: Arc<ApiRegistry>,
    sessions: SessionStore,
    resolver: ParameterResolver,
    clarifier: ClarificationGenerator,
    dispatcher: ApiDispatcher,
    model: Option<Arc<dyn LanguageModel>>,
    last_session_micros: AtomicU64,
}

impl Orchestrator {
    pub fn builder(registry: ApiRegistry) -> OrchestratorBuilder {
        OrchestratorBuilder::new(registry)
    }

    /// Orchestrator wired from configuration: registry file, genai model and
    /// the built-in integrations
    pub async fn from_config(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        let path = config.registry_path.clone().ok_or_else(|| {
            OrchestratorError::configuration("registry_path is required to load the API registry")
        })?;
        let registry = ApiRegistry::load(&path)?;
        if !config.model.has_credentials() {
            warn!(model = %config.model.model_name, "no model credentials found, generated text will fall back to templates");
        }
        let model: Arc<dyn LanguageModel> = Arc::new(GenAiModel::new(config.model.clone()));

        Ok(Self::builder(registry)
            .with_config(config)
            .with_model(model)
            .with_builtin_integrations()
            .build()
            .await)
    }

    pub fn api_registry(&self) -> &ApiRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &ApiDispatcher {
        &self.dispatcher
    }

    pub async fn register_handler(&self, handler: Arc<dyn ApiHandler>) {
        self.dispatcher.register(handler).await;
    }

    /// Snapshot of a live session
    pub async fn session(&self, session_id: &str) -> Option<ExecutionSession> {
        let handle = self.sessions.get(session_id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Ask the language model which APIs a request needs
    pub async fn extract_intent(&self, user_prompt: &str) -> IntentExtraction {
        match &self.model {
            Some(model) => {
                IntentExtractor::new(Arc::clone(model), Arc::clone(&self.registry))
                    .extract(user_prompt)
                    .await
            }
            None => IntentExtraction::failed(&intentflow_agent::AgentError::configuration(
                "no language model configured",
            )),
        }
    }

    /// Extract intent from free text and, when there is a workflow, plan it
    pub async fn process_intent(
        &self,
        user_prompt: &str,
        session_id: Option<String>,
    ) -> IntentOutcome {
        let extraction = self.extract_intent(user_prompt).await;
        if !extraction.has_agent_intention || extraction.workflow.is_empty() {
            info!(reasoning = %extraction.reasoning, "no API intention in request");
            return IntentOutcome::NoIntention { extraction };
        }
        let plan = self
            .create_execution_plan(extraction.workflow.clone(), session_id)
            .await;
        IntentOutcome::PlanCreated { plan, extraction }
    }

    /// Build a session from extracted workflow steps.
    ///
    /// Steps naming an unknown (software, api) pair are skipped. Ids are
    /// `step_<n>` over the kept steps.
    pub async fn create_execution_plan(
        &self,
        workflow: Vec<WorkflowStep>,
        session_id: Option<String>,
    ) -> ExecutionPlan {
        let session_id = session_id.unwrap_or_else(|| self.next_session_id());

        let mut plan = Vec::with_capacity(workflow.len());
        for step in &workflow {
            match self.registry.find_api(&step.software, &step.api.name) {
                Some(api) => plan.push(ExecutionStep::from_workflow(plan.len() + 1, step, api)),
                None => warn!(
                    session_id = %session_id,
                    software = %step.software,
                    api = %step.api.name,
                    "API not found, skipping workflow step"
                ),
            }
        }

        info!(
            session_id = %session_id,
            steps = plan.len(),
            skipped = workflow.len() - plan.len(),
            "created execution plan"
        );
        record("intentflow_plans_created_total");

        let session = ExecutionSession::new(session_id.clone(), workflow, plan.clone());
        self.sessions.insert(session).await;
        ExecutionPlan { session_id, plan }
    }

    /// Execute one step: the named one, or the one under the cursor
    pub async fn execute_step(
        &self,
        session_id: &str,
        step_id: Option<&str>,
        additional_context: Option<Value>,
    ) -> StepOutcome {
        let Some(handle) = self.lookup(session_id).await else {
            return StepOutcome::rejected(FlowError::session_not_found(session_id));
        };
        let mut session = handle.lock().await;
        self.run_step(&mut session, step_id, additional_context)
            .await
    }

    /// Merge user answers into a step's parameters and run it again
    pub async fn provide_clarification(
        &self,
        session_id: &str,
        step_id: &str,
        responses: Map<String, Value>,
    ) -> StepOutcome {
        let Some(handle) = self.lookup(session_id).await else {
            return StepOutcome::rejected(FlowError::session_not_found(session_id));
        };
        let mut session = handle.lock().await;
        let Some(step) = session.step_mut(step_id) else {
            warn!(session_id, step_id, "clarification for unknown step");
            return StepOutcome::rejected(FlowError::step_not_found(session_id, step_id));
        };
        debug!(session_id, step_id, fields = responses.len(), "applying clarification");
        step.merge_parameters(&responses);
        self.run_step(&mut session, Some(step_id), None).await
    }

    async fn lookup(&self, session_id: &str) -> Option<SessionHandle> {
        let handle = self.sessions.get(session_id).await;
        if handle.is_none() {
            warn!(session_id, "session not found");
        }
        handle
    }

    async fn run_step(
        &self,
        session: &mut ExecutionSession,
        step_id: Option<&str>,
        additional_context: Option<Value>,
    ) -> StepOutcome {
        let index = match step_id {
            Some(id) => match session.step_index(id) {
                Some(index) => index,
                None => {
                    warn!(session_id = %session.session_id, step_id = id, "step not found");
                    return StepOutcome::rejected(FlowError::step_not_found(
                        &session.session_id,
                        id,
                    ));
                }
            },
            None => match session.current_step() {
                Some(_) => session.current_step_index,
                None => return StepOutcome::AllCompleted,
            },
        };
        let step_id = session.plan[index].id.clone();

        if session.plan[index].status.is_terminal() {
            // Completed out of order; the cursor catches up without a second call.
            if index == session.current_step_index {
                session.current_step_index += 1;
            }
            debug!(session_id = %session.session_id, step_id = %step_id, "step already completed");
            return Self::completed(session, step_id);
        }

        if session.plan[index].status.is_runnable() {
            if let Err(err) = session.plan[index].transition(StepStatus::InProgress) {
                error!(session_id = %session.session_id, step_id = %step_id, error = %err, "rejected transition");
                return StepOutcome::rejected(err);
            }
        }

        if let Some(context) = additional_context {
            if let Some(Value::Object(parameters)) = context.get("parameters") {
                session.plan[index].merge_parameters(parameters);
            }
            session.user_context.insert(step_id.clone(), context);
        }

        let resolved = match self.resolver.resolve(&session.plan[index], session) {
            Ok(resolved) => resolved,
            Err(err) => {
                let message = err.to_string();
                error!(session_id = %session.session_id, step_id = %step_id, error = %message, "parameter resolution failed");
                return self.fail(
                    session,
                    index,
                    format!("Parameter resolution error: {message}"),
                    message,
                    None,
                );
            }
        };

        let missing = session.plan[index].missing_parameters(&resolved);
        if !missing.is_empty() {
            info!(
                session_id = %session.session_id,
                step_id = %step_id,
                missing = missing.len(),
                "step needs clarification"
            );
            if let Err(err) = session.plan[index].transition(StepStatus::NeedsClarification) {
                return StepOutcome::rejected(err);
            }
            record("intentflow_clarifications_requested_total");
            let questions = self
                .clarifier
                .clarification_questions(&session.plan[index].api, &missing)
                .await;
            return StepOutcome::NeedsClarification {
                step_id,
                questions: questions.text,
                missing_params: missing,
                plan: session.plan.clone(),
            };
        }

        let software = session.plan[index].software.clone();
        let api = session.plan[index].api.clone();
        info!(
            session_id = %session.session_id,
            step_id = %step_id,
            software = %software,
            api = %api.name,
            "dispatching step"
        );
        match self
            .dispatcher
            .execute_api(&software, &api.name, &resolved)
            .await
        {
            Ok(result) => {
                if let Err(err) = session.complete_step(index, result) {
                    return StepOutcome::rejected(err);
                }
                record("intentflow_steps_completed_total");
                info!(session_id = %session.session_id, step_id = %step_id, "step completed");
                Self::completed(session, step_id)
            }
            Err(err) => {
                let message = err.to_string();
                error!(
                    session_id = %session.session_id,
                    step_id = %step_id,
                    category = %err.category(),
                    error = %message,
                    "API call failed"
                );
                let suggestion = self.clarifier.error_suggestion(&api, &message).await;
                self.fail(session, index, message.clone(), message, Some(suggestion.text))
            }
        }
    }

    fn fail(
        &self,
        session: &mut ExecutionSession,
        index: usize,
        step_error: String,
        error: String,
        suggestion: Option<String>,
    ) -> StepOutcome {
        let step = &mut session.plan[index];
        if let Err(err) = step.fail(step_error) {
            return StepOutcome::rejected(err);
        }
        record("intentflow_steps_failed_total");
        StepOutcome::Failed {
            step_id: step.id.clone(),
            error,
            suggestion,
            plan: session.plan.clone(),
        }
    }

    fn completed(session: &ExecutionSession, step_id: String) -> StepOutcome {
        StepOutcome::Completed {
            result: session.result_of(&step_id).cloned().unwrap_or(Value::Null),
            next_step_id: session.next_step_id(),
            plan: session.plan.clone(),
            step_id,
        }
    }

    /// `session_<YYYYmmddHHMMSSffffff>`, strictly increasing per orchestrator
    fn next_session_id(&self) -> String {
        let now = u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0);
        let mut last = self.last_session_micros.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_session_micros.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format_session_id(candidate),
                Err(actual) => last = actual,
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("software", &self.registry.len())
            .field("sessions", &self.sessions)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

fn format_session_id(micros: u64) -> String {
    let secs = i64::try_from(micros / 1_000_000).unwrap_or(i64::MAX);
    let nanos = u32::try_from((micros % 1_000_000) * 1_000).unwrap_or(0);
    match DateTime::from_timestamp(secs, nanos) {
        Some(time) => format!("session_{}", time.format("%Y%m%d%H%M%S%6f")),
        None => format!("session_{micros}"),
    }
}

#[cfg(feature = "metrics")]
fn record(name: &'static str) {
    metrics::counter!(name).increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record(_name: &'static str) {}

/// Builder for [`Orchestrator`]
pub struct OrchestratorBuilder {
    registry: ApiRegistry,
    config: OrchestratorConfig,
    model: Option<Arc<dyn LanguageModel>>,
    transport: Option<Arc<dyn HttpTransport>>,
    handlers: Vec<Arc<dyn ApiHandler>>,
    builtins: bool,
}

impl OrchestratorBuilder {
    pub fn new(registry: ApiRegistry) -> Self {
        Self {
            registry,
            config: OrchestratorConfig::default(),
            model: None,
            transport: None,
            handlers: Vec::new(),
            builtins: false,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Model used for clarification questions, suggestions, intent
    /// extraction and the `Gemini/Chat` integration
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn ApiHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Register You.com, Google Custom Search and, with a model, Gemini chat
    pub fn with_builtin_integrations(mut self) -> Self {
        self.builtins = true;
        self
    }

    pub async fn build(self) -> Orchestrator {
        let timeout = self.config.http_timeout();
        let dispatcher = match self.transport {
            Some(transport) => ApiDispatcher::new(HandlerRegistry::new(), transport),
            None => ApiDispatcher::with_default_transport(HandlerRegistry::new()),
        }
        .with_demo_fallback(self.config.mock_fallback)
        .with_http_timeout(timeout);

        if self.builtins {
            let transport = dispatcher.transport();
            let you = Arc::new(YouComClient::from_env(Arc::clone(&transport)).with_timeout(timeout));
            dispatcher
                .register(Arc::new(YouComHandler::smart_search(Arc::clone(&you))))
                .await;
            dispatcher
                .register(Arc::new(YouComHandler::research(you)))
                .await;
            let google = GoogleSearchClient::from_env(transport).with_timeout(timeout);
            dispatcher
                .register(Arc::new(GoogleSearchHandler::new(Arc::new(google))))
                .await;
            if let Some(model) = &self.model {
                dispatcher
                    .register(Arc::new(ChatHandler::new(Arc::clone(model))))
                    .await;
            }
        }
        for handler in self.handlers {
            dispatcher.register(handler).await;
        }

        let clarifier = match &self.model {
            Some(model) => ClarificationGenerator::new(Arc::clone(model)),
            None => ClarificationGenerator::templates_only(),
        };

        let handlers = dispatcher.handlers().len().await;
        info!(
            software = self.registry.len(),
            handlers,
            mock_fallback = self.config.mock_fallback,
            "orchestrator ready"
        );

        Orchestrator {
            registry: Arc::new(self.registry),
            sessions: SessionStore::new(self.config.session_ttl(), self.config.max_sessions),
            resolver: ParameterResolver::new(),
            clarifier,
            dispatcher,
            model: self.model,
            last_session_micros: AtomicU64::new(0),
        }
    }
}

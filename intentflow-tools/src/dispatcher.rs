//! API dispatch policy.

use std::{sync::Arc, time::Duration};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    core::{ApiHandler, ApiParameters},
    error::{Result, ToolError},
    http::{DEFAULT_TIMEOUT, HttpRequest, HttpTransport},
    mock::DemoResponder,
    registry::HandlerRegistry,
};

/// Which path a call takes through the dispatch policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRoute {
    /// A registered handler for the exact (software, api) pair
    Handler,
    /// Raw HTTP described by `http_*` parameters
    Http,
    /// Canned demo response
    Demo,
    /// Nothing applies and the demo fallback is disabled
    Unroutable,
}

/// Maps (software, api, parameters) to an external call
///
/// Policy, first match wins: registered handler, raw HTTP, demo responder.
#[derive(Clone)]
pub struct ApiDispatcher {
    handlers: HandlerRegistry,
    transport: Arc<dyn HttpTransport>,
    demo: Option<DemoResponder>,
    http_timeout: Duration,
}

impl ApiDispatcher {
    pub fn new(handlers: HandlerRegistry, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            handlers,
            transport,
            demo: Some(DemoResponder::new()),
            http_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Dispatcher with the default transport for this build
    pub fn with_default_transport(handlers: HandlerRegistry) -> Self {
        #[cfg(feature = "http")]
        let transport: Arc<dyn HttpTransport> = Arc::new(crate::http::ReqwestTransport::new());
        #[cfg(not(feature = "http"))]
        let transport: Arc<dyn HttpTransport> = Arc::new(crate::http::DisabledTransport);
        Self::new(handlers, transport)
    }

    /// Enable or disable the demo fallback
    pub fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo = enabled.then(DemoResponder::new);
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    pub async fn register(&self, handler: Arc<dyn ApiHandler>) {
        self.handlers.register(handler).await;
    }

    /// The route `execute_api` would take, without calling anything
    pub async fn route(
        &self,
        software: &str,
        api_name: &str,
        parameters: &Map<String, Value>,
    ) -> DispatchRoute {
        if self.handlers.contains(software, api_name).await {
            DispatchRoute::Handler
        } else if parameters.contains_key(crate::http::URL_FIELD) {
            DispatchRoute::Http
        } else if self.demo.is_some() {
            DispatchRoute::Demo
        } else {
            DispatchRoute::Unroutable
        }
    }

    /// Execute an API call with resolved parameters
    pub async fn execute_api(
        &self,
        software: &str,
        api_name: &str,
        parameters: &Map<String, Value>,
    ) -> Result<Value> {
        info!(software, api = api_name, "executing API");
        debug!(parameters = %serde_json::Value::Object(parameters.clone()), "API parameters");

        if let Some(handler) = self.handlers.get(software, api_name).await {
            return handler.call(ApiParameters::new(parameters.clone())).await;
        }

        if let Some(request) = HttpRequest::from_parameters(parameters, self.http_timeout)? {
            debug!(url = %request.url, method = %request.method, "dispatching raw HTTP call");
            return self.transport.request(request).await;
        }

        match &self.demo {
            Some(demo) => {
                debug!(software, api = api_name, "no integration, using demo response");
                Ok(demo.respond(software, api_name, parameters))
            }
            None => Err(ToolError::not_found(format!(
                "no integration registered for {software}/{api_name}"
            ))),
        }
    }
}

impl std::fmt::Debug for ApiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDispatcher")
            .field("demo_fallback", &self.demo.is_some())
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

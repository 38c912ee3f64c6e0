//! Search integrations: You.com and Google Custom Search.
//!
//! Both clients build [`HttpRequest`]s and send them through an
//! [`HttpTransport`], so they share timeout and error handling with the raw
//! HTTP path.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{ApiHandler, ApiParameters},
    error::{Result, ToolError},
    http::{DEFAULT_TIMEOUT, HttpRequest, HttpTransport},
};

pub const YOU_SMART_API_URL: &str = "https://chat-api.you.com/smart";
pub const YOU_RESEARCH_API_URL: &str = "https://chat-api.you.com/research";
pub const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search returns at most this many results per request
pub const GOOGLE_MAX_RESULTS: u32 = 10;

/// You.com API client
///
/// One chat id is generated per client and sent with every request.
pub struct YouComClient {
    api_key: Option<String>,
    chat_id: String,
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl YouComClient {
    pub fn new(api_key: Option<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_key,
            chat_id: Uuid::new_v4().to_string(),
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the key from `YOU_API_KEY`
    pub fn from_env(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(std::env::var("YOU_API_KEY").ok(), transport)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ToolError::configuration("You.com API key must be set as YOU_API_KEY"))
    }

    /// AI-answered search, optionally tailored by `instructions`
    pub async fn smart_search(&self, query: &str, instructions: Option<&str>) -> Result<Value> {
        let mut payload = json!({ "query": query, "chat_id": self.chat_id });
        if let Some(instructions) = instructions.filter(|i| !i.is_empty()) {
            payload["instructions"] = json!(instructions);
        }
        self.post(YOU_SMART_API_URL, payload).await
    }

    /// Deep research query
    pub async fn research(&self, query: &str) -> Result<Value> {
        let payload = json!({ "query": query, "chat_id": self.chat_id });
        self.post(YOU_RESEARCH_API_URL, payload).await
    }

    async fn post(&self, url: &str, payload: Value) -> Result<Value> {
        let request = HttpRequest::new(url)
            .with_method("POST")
            .with_header("X-API-Key", self.api_key()?)
            .with_header("Content-Type", "application/json")
            .with_body(payload)
            .with_timeout(self.timeout);
        info!(url, "calling You.com API");
        self.transport.request(request).await
    }
}

/// Which You.com endpoint a handler targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YouComEndpoint {
    SmartSearch,
    Research,
}

/// Registry handler for `YouCom/SmartSearch` and `YouCom/Research`
pub struct YouComHandler {
    client: Arc<YouComClient>,
    endpoint: YouComEndpoint,
}

impl YouComHandler {
    pub fn smart_search(client: Arc<YouComClient>) -> Self {
        Self {
            client,
            endpoint: YouComEndpoint::SmartSearch,
        }
    }

    pub fn research(client: Arc<YouComClient>) -> Self {
        Self {
            client,
            endpoint: YouComEndpoint::Research,
        }
    }
}

#[async_trait]
impl ApiHandler for YouComHandler {
    fn software(&self) -> &str {
        "YouCom"
    }

    fn api(&self) -> &str {
        match self.endpoint {
            YouComEndpoint::SmartSearch => "SmartSearch",
            YouComEndpoint::Research => "Research",
        }
    }

    fn description(&self) -> &str {
        match self.endpoint {
            YouComEndpoint::SmartSearch => "You.com Smart API search",
            YouComEndpoint::Research => "You.com Research API query",
        }
    }

    async fn call(&self, parameters: ApiParameters) -> Result<Value> {
        let query: String = parameters.get_or("query", String::new())?;
        match self.endpoint {
            YouComEndpoint::SmartSearch => {
                let instructions = parameters.get_string_optional("instructions")?;
                self.client
                    .smart_search(&query, instructions.as_deref())
                    .await
            }
            YouComEndpoint::Research => self.client.research(&query).await,
        }
    }
}

/// Google Custom Search JSON API client
pub struct GoogleSearchClient {
    api_key: Option<String>,
    cse_id: Option<String>,
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl GoogleSearchClient {
    pub fn new(
        api_key: Option<String>,
        cse_id: Option<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            api_key,
            cse_id,
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read credentials from `GOOGLE_API_KEY` and `GOOGLE_CSE_ID`
    pub fn from_env(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            std::env::var("GOOGLE_API_KEY").ok(),
            std::env::var("GOOGLE_CSE_ID").ok(),
            transport,
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn search(&self, query: &str, num_results: u32) -> Result<Value> {
        let (Some(key), Some(cx)) = (
            self.api_key.as_deref().filter(|k| !k.is_empty()),
            self.cse_id.as_deref().filter(|c| !c.is_empty()),
        ) else {
            return Err(ToolError::configuration(
                "Google API Key and CSE ID must be set as GOOGLE_API_KEY and GOOGLE_CSE_ID",
            ));
        };

        let request = HttpRequest::new(GOOGLE_SEARCH_URL)
            .with_query("key", key)
            .with_query("cx", cx)
            .with_query("q", query)
            .with_query("num", num_results.min(GOOGLE_MAX_RESULTS).to_string())
            .with_timeout(self.timeout);
        info!(query, "calling Google Custom Search");
        self.transport.request(request).await
    }
}

/// Registry handler for `GoogleSearch/Search`
pub struct GoogleSearchHandler {
    client: Arc<GoogleSearchClient>,
}

impl GoogleSearchHandler {
    pub fn new(client: Arc<GoogleSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiHandler for GoogleSearchHandler {
    fn software(&self) -> &str {
        "GoogleSearch"
    }

    fn api(&self) -> &str {
        "Search"
    }

    fn description(&self) -> &str {
        "Google Custom Search"
    }

    async fn call(&self, parameters: ApiParameters) -> Result<Value> {
        let query: String = parameters.get_or("query", String::new())?;
        let num_results: u32 = parameters.get_or("num_results", 5)?;
        self.client.search(&query, num_results).await
    }
}

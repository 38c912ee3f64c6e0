//! Generic HTTP calls for APIs without a dedicated handler.
//!
//! A step whose parameters carry `http_api_url` is sent as a raw HTTP
//! request. Recognised fields:
//! - `http_api_url` (string, required): target URL
//! - `http_method` (string, optional): defaults to `GET`
//! - `http_headers` (object, optional): header name -> string value
//! - `http_params` (object, optional): query parameters
//! - `http_data` (any, optional): JSON body, sent only for POST/PUT/PATCH

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::error::{Result, ToolError};

pub const URL_FIELD: &str = "http_api_url";
pub const METHOD_FIELD: &str = "http_method";
pub const HEADERS_FIELD: &str = "http_headers";
pub const PARAMS_FIELD: &str = "http_params";
pub const BODY_FIELD: &str = "http_data";

/// Timeout applied when the request does not set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully described outbound HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_ascii_uppercase();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True for methods that carry a JSON body
    pub fn sends_body(&self) -> bool {
        matches!(self.method.as_str(), "POST" | "PUT" | "PATCH")
    }

    /// Build a request from raw-HTTP step parameters.
    ///
    /// Returns `Ok(None)` when the parameters carry no `http_api_url`.
    pub fn from_parameters(parameters: &Map<String, Value>, timeout: Duration) -> Result<Option<Self>> {
        let Some(url) = parameters.get(URL_FIELD) else {
            return Ok(None);
        };
        let url = url
            .as_str()
            .ok_or_else(|| ToolError::invalid_field(URL_FIELD, "must be a string"))?;

        let method = match parameters.get(METHOD_FIELD) {
            None | Some(Value::Null) => "GET",
            Some(Value::String(method)) => method.as_str(),
            Some(_) => return Err(ToolError::invalid_field(METHOD_FIELD, "must be a string")),
        };

        let mut request = Self::new(url).with_method(method).with_timeout(timeout);
        request.headers = string_pairs(parameters, HEADERS_FIELD)?;
        request.query = string_pairs(parameters, PARAMS_FIELD)?;
        request.body = match parameters.get(BODY_FIELD) {
            None | Some(Value::Null) => None,
            Some(body) if request.sends_body() => Some(body.clone()),
            Some(_) => None,
        };
        Ok(Some(request))
    }
}

fn string_pairs(parameters: &Map<String, Value>, field: &str) -> Result<Vec<(String, String)>> {
    match parameters.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()),
        Some(_) => Err(ToolError::invalid_field(field, "must be an object")),
    }
}

/// Decode a success body: JSON when it parses, else `{"text": body}`
pub fn decode_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| json!({ "text": body }))
}

/// Best-effort detail from an error body
///
/// A JSON object's `error` field wins, then the whole JSON document, then
/// the raw text, then the status line.
pub fn error_detail(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        Ok(other) => other.to_string(),
        Err(_) if !body.trim().is_empty() => body.to_string(),
        Err(_) => fallback.to_string(),
    }
}

/// Generic HTTP collaborator
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request; non-2xx and network failures are errors
    async fn request(&self, request: HttpRequest) -> Result<Value>;
}

/// Transport backed by a shared `reqwest::Client`
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<Value> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ToolError::invalid_field(METHOD_FIELD, format!("is not a valid method: {}", request.method)))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(url = %request.url, error = %e, "HTTP request failed");
            if e.is_timeout() {
                ToolError::timeout(e.to_string())
            } else {
                ToolError::network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(url = %request.url, status = status.as_u16(), "HTTP error response");
            return Err(ToolError::http(
                status.as_u16(),
                error_detail(&body, &status.to_string()),
            ));
        }
        Ok(decode_body(&body))
    }
}

/// Transport used when the `http` feature is disabled
#[cfg(not(feature = "http"))]
#[derive(Debug, Clone, Default)]
pub struct DisabledTransport;

#[cfg(not(feature = "http"))]
#[async_trait]
impl HttpTransport for DisabledTransport {
    async fn request(&self, _request: HttpRequest) -> Result<Value> {
        Err(ToolError::configuration(
            "HTTP feature not enabled for raw HTTP calls",
        ))
    }
}

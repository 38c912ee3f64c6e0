use async_trait::async_trait;
use serde_json::Value;

use crate::{
    core::{ApiHandler, ApiParameters},
    error::Result,
};

type HandlerFn = Box<dyn Fn(ApiParameters) -> Result<Value> + Send + Sync>;

/// Handler backed by a synchronous closure
///
/// Useful for in-process integrations and for tests.
pub struct FnHandler {
    software: String,
    api: String,
    description: String,
    func: HandlerFn,
}

impl FnHandler {
    pub fn new<F>(software: impl Into<String>, api: impl Into<String>, func: F) -> Self
    where
        F: Fn(ApiParameters) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            software: software.into(),
            api: api.into(),
            description: String::new(),
            func: Box::new(func),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[async_trait]
impl ApiHandler for FnHandler {
    fn software(&self) -> &str {
        &self.software
    }

    fn api(&self) -> &str {
        &self.api
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, parameters: ApiParameters) -> Result<Value> {
        (self.func)(parameters)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ToolError;

    #[tokio::test]
    async fn closure_receives_parameters() {
        let handler = FnHandler::new("Text", "Upper", |params| {
            let text: String = params.get("text")?;
            Ok(json!(text.to_uppercase()))
        })
        .with_description("Uppercase text");

        let mut map = serde_json::Map::new();
        map.insert("text".into(), json!("abc"));
        assert_eq!(handler.call(map.into()).await.unwrap(), json!("ABC"));
        assert_eq!(handler.description(), "Uppercase text");

        let err = handler.call(ApiParameters::empty()).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidField { .. }));
    }
}

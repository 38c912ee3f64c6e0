//! IntentFlow Tools - API dispatch for workflow steps
//!
//! This crate turns a (software, api, parameters) triple into an external
//! call. It includes:
//!
//! - The [`ApiHandler`] abstraction and a [`HandlerRegistry`] keyed by
//!   (software, api)
//! - A generic HTTP path driven by `http_*` parameters
//! - You.com and Google Custom Search integrations
//! - A demo responder for APIs with no integration yet
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use intentflow_tools::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let dispatcher = ApiDispatcher::with_default_transport(HandlerRegistry::new());
//!     dispatcher
//!         .register(Arc::new(FnHandler::new("Echo", "Say", |params| {
//!             Ok(json!({ "said": params.get::<String>("text")? }))
//!         })))
//!         .await;
//!
//!     let params = json!({"text": "hi"}).as_object().cloned().unwrap();
//!     let result = dispatcher.execute_api("Echo", "Say", &params).await?;
//!     assert_eq!(result["said"], "hi");
//!     Ok(())
//! }
//! ```

/// Handler trait and parameter access.
pub mod core;
/// Closure-backed handlers.
pub mod custom;
/// Dispatch policy.
pub mod dispatcher;
/// Error types for dispatch operations.
pub mod error;
/// Generic HTTP requests and transport.
pub mod http;
/// Demo responses for unmapped APIs.
pub mod mock;
/// Handler table.
pub mod registry;
/// Search integrations.
pub mod search;

pub use core::{ApiHandler, ApiKey, ApiParameters};

pub use dispatcher::{ApiDispatcher, DispatchRoute};
pub use error::{ErrorCategory, Result, ToolError};
pub use registry::HandlerRegistry;

/// Prelude module for convenient imports
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};

    pub use crate::{
        core::{ApiHandler, ApiKey, ApiParameters},
        custom::FnHandler,
        dispatcher::{ApiDispatcher, DispatchRoute},
        error::{ErrorCategory, Result, ToolError},
        http::{HttpRequest, HttpTransport},
        mock::DemoResponder,
        registry::HandlerRegistry,
        search::{GoogleSearchClient, GoogleSearchHandler, YouComClient, YouComHandler},
    };
}

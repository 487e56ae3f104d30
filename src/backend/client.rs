//! `ChatBackend` trait — abstraction over the remote chat endpoint.
//!
//! The conversation client only needs two calls: send the history plus
//! skill catalog, and probe liveness. The HTTP implementation lives in
//! [`super::http`]; tests substitute in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

use super::{BackendError, ChatRequest};

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST {base_url}/chat`. Returns the raw JSON payload, which the
    /// response normalizer is responsible for interpreting.
    async fn chat(&self, base_url: &str, request: &ChatRequest<'_>) -> Result<Value, BackendError>;

    /// `GET {base_url}/health`. Returns the raw JSON payload.
    async fn health(&self, base_url: &str) -> Result<Value, BackendError>;
}

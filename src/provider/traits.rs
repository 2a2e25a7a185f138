use async_trait::async_trait;

use crate::{error::Result, models::ChatRequest};

/// A configured client for a chat-completion endpoint that accepts images.
///
/// Implementations return the assistant's free-form text. Transport failures
/// and non-success statuses come back as `MemeError::Provider`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

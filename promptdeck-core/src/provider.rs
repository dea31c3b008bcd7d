//! Provider trait and core abstractions.

use crate::error::PromptError;
use crate::types::*;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Pluggable backend that answers prompts.
///
/// Only `info` is required. Each capability hook is optional: the default
/// body produces [`PromptResponse::Empty`], which the dispatcher treats the
/// same as a provider that legitimately returned nothing.
#[async_trait]
pub trait PromptProvider: Send + Sync + Debug + 'static {
    /// Get provider information
    fn info(&self) -> Arc<ProviderInfo>;

    /// Answer a one-off prompt
    async fn handle_single_prompt(
        &self,
        _prompt: &str,
        _payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        Ok(PromptResponse::Empty)
    }

    /// Answer the latest turn of a chat, given the full history
    async fn handle_continuous_prompt(
        &self,
        _messages: &[PromptMessage],
        _payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        Ok(PromptResponse::Empty)
    }

    /// Generate an image for a prompt
    async fn handle_image_prompt(
        &self,
        _prompt: &str,
        _payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        Ok(PromptResponse::Empty)
    }
}

#[async_trait]
impl<P: PromptProvider + ?Sized> PromptProvider for Arc<P> {
    fn info(&self) -> Arc<ProviderInfo> {
        (**self).info()
    }

    async fn handle_single_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        (**self).handle_single_prompt(prompt, payload).await
    }

    async fn handle_continuous_prompt(
        &self,
        messages: &[PromptMessage],
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        (**self).handle_continuous_prompt(messages, payload).await
    }

    async fn handle_image_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        (**self).handle_image_prompt(prompt, payload).await
    }
}

/// Helper function to drain a response stream into a single string
pub async fn collect_prompt_stream(mut stream: Box<PromptStream>) -> Result<String, PromptError> {
    use futures::StreamExt;

    let mut content = String::new();
    while let Some(chunk) = stream.next().await {
        content.push_str(&chunk?);
    }

    Ok(content)
}

//! Logging layer for provider capability hooks.

use async_trait::async_trait;
use futures::Stream;
use pin_project::pin_project;
use promptdeck_core::error::PromptError;
use promptdeck_core::layer::{Layer, LayeredProvider};
use promptdeck_core::provider::PromptProvider;
use promptdeck_core::types::*;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Logging layer that logs provider operations.
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    prefix: String,
}

impl LoggingLayer {
    /// Create a new logging layer
    pub fn new() -> Self {
        Self {
            prefix: "[Promptdeck]".to_string(),
        }
    }

    /// Create a logging layer with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PromptProvider> Layer<P> for LoggingLayer {
    type LayeredProvider = LoggingProvider<P>;

    fn layer(&self, inner: P) -> Self::LayeredProvider {
        LoggingProvider {
            inner,
            prefix: self.prefix.clone(),
        }
    }
}

/// Provider wrapped with logging
#[derive(Debug)]
pub struct LoggingProvider<P> {
    inner: P,
    prefix: String,
}

impl<P: PromptProvider> LoggingProvider<P> {
    fn observe(
        &self,
        capability: Capability,
        payload: &HandlerPayload,
        result: Result<PromptResponse, PromptError>,
        elapsed: Duration,
    ) -> Result<PromptResponse, PromptError> {
        match result {
            Ok(PromptResponse::Stream(stream)) => {
                tracing::debug!(
                    "{} {} opened stream: conversation={}, elapsed={:?}",
                    self.prefix,
                    capability,
                    payload.conversation_id,
                    elapsed
                );
                Ok(PromptResponse::Stream(Box::new(LoggedStream::new(
                    stream,
                    self.prefix.clone(),
                    payload.conversation_id.clone(),
                ))))
            }
            Ok(response) => {
                tracing::debug!(
                    "{} {} success: conversation={}, response={}, elapsed={:?}",
                    self.prefix,
                    capability,
                    payload.conversation_id,
                    response.kind(),
                    elapsed
                );
                Ok(response)
            }
            Err(e) => {
                tracing::error!(
                    "{} {} error: conversation={}, {:?}, elapsed={:?}",
                    self.prefix,
                    capability,
                    payload.conversation_id,
                    e,
                    elapsed
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<P: PromptProvider> LayeredProvider for LoggingProvider<P> {
    type Inner = P;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn layered_single_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        tracing::debug!(
            "{} handle_single_prompt request: conversation={}, prompt_len={}",
            self.prefix,
            payload.conversation_id,
            prompt.len()
        );

        let start = Instant::now();
        let result = self.inner.handle_single_prompt(prompt, payload).await;
        self.observe(Capability::SinglePrompt, payload, result, start.elapsed())
    }

    async fn layered_continuous_prompt(
        &self,
        messages: &[PromptMessage],
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        tracing::debug!(
            "{} handle_continuous_prompt request: conversation={}, messages={}",
            self.prefix,
            payload.conversation_id,
            messages.len()
        );

        let start = Instant::now();
        let result = self.inner.handle_continuous_prompt(messages, payload).await;
        self.observe(
            Capability::ContinuousPrompt,
            payload,
            result,
            start.elapsed(),
        )
    }

    async fn layered_image_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        tracing::debug!(
            "{} handle_image_prompt request: conversation={}, prompt_len={}",
            self.prefix,
            payload.conversation_id,
            prompt.len()
        );

        let start = Instant::now();
        let result = self.inner.handle_image_prompt(prompt, payload).await;
        self.observe(Capability::ImagePrompt, payload, result, start.elapsed())
    }
}

#[async_trait]
impl<P: PromptProvider> PromptProvider for LoggingProvider<P> {
    fn info(&self) -> Arc<ProviderInfo> {
        LayeredProvider::layered_info(self)
    }

    async fn handle_single_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        LayeredProvider::layered_single_prompt(self, prompt, payload).await
    }

    async fn handle_continuous_prompt(
        &self,
        messages: &[PromptMessage],
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        LayeredProvider::layered_continuous_prompt(self, messages, payload).await
    }

    async fn handle_image_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        LayeredProvider::layered_image_prompt(self, prompt, payload).await
    }
}

/// Response stream that logs a summary once it is exhausted.
///
/// Chunks pass through untouched.
#[pin_project]
pub struct LoggedStream<S> {
    #[pin]
    inner: S,
    prefix: String,
    conversation_id: String,
    chunks: usize,
    bytes: usize,
    start: Instant,
    finished: bool,
}

impl<S> LoggedStream<S> {
    pub fn new(inner: S, prefix: String, conversation_id: String) -> Self {
        Self {
            inner,
            prefix,
            conversation_id,
            chunks: 0,
            bytes: 0,
            start: Instant::now(),
            finished: false,
        }
    }

    /// Chunks yielded so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }
}

impl<S> Stream for LoggedStream<S>
where
    S: Stream<Item = Result<String, PromptError>>,
{
    type Item = Result<String, PromptError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                *this.chunks += 1;
                *this.bytes += chunk.len();
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::error!(
                    "{} stream error: conversation={}, after_chunks={}, {:?}",
                    this.prefix,
                    this.conversation_id,
                    this.chunks,
                    e
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if !*this.finished {
                    *this.finished = true;
                    tracing::debug!(
                        "{} stream finished: conversation={}, chunks={}, bytes={}, elapsed={:?}",
                        this.prefix,
                        this.conversation_id,
                        this.chunks,
                        this.bytes,
                        this.start.elapsed()
                    );
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

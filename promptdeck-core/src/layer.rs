//! Layer trait and abstractions.
//!
//! Layers wrap a provider with cross-cutting concerns such as logging,
//! without the dispatcher knowing anything about them.

use crate::error::PromptError;
use crate::provider::PromptProvider;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Layer trait for wrapping providers.
///
/// Each layer wraps an inner provider and returns a new provider with
/// enhanced behavior.
pub trait Layer<P: PromptProvider> {
    /// The type of the layered provider
    type LayeredProvider: PromptProvider;

    /// Wrap the inner provider with this layer
    fn layer(&self, inner: P) -> Self::LayeredProvider;
}

/// Helper trait for layered providers.
///
/// Provides forwarding implementations for every provider hook. Implementers
/// only override the hooks they want to intercept.
#[async_trait]
pub trait LayeredProvider: Sized + PromptProvider {
    /// The inner provider type
    type Inner: PromptProvider;

    /// Get a reference to the inner provider
    fn inner(&self) -> &Self::Inner;

    /// Default implementation for info - forwards to inner
    fn layered_info(&self) -> Arc<ProviderInfo> {
        self.inner().info()
    }

    /// Default implementation for handle_single_prompt - forwards to inner
    async fn layered_single_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        self.inner().handle_single_prompt(prompt, payload).await
    }

    /// Default implementation for handle_continuous_prompt - forwards to inner
    async fn layered_continuous_prompt(
        &self,
        messages: &[PromptMessage],
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        self.inner().handle_continuous_prompt(messages, payload).await
    }

    /// Default implementation for handle_image_prompt - forwards to inner
    async fn layered_image_prompt(
        &self,
        prompt: &str,
        payload: &HandlerPayload,
    ) -> Result<PromptResponse, PromptError> {
        self.inner().handle_image_prompt(prompt, payload).await
    }
}

/// Macro to implement PromptProvider by forwarding to LayeredProvider methods.
#[macro_export]
macro_rules! impl_layered_provider {
    ($type:ty) => {
        #[async_trait::async_trait]
        impl $crate::provider::PromptProvider for $type {
            fn info(&self) -> std::sync::Arc<$crate::types::ProviderInfo> {
                $crate::layer::LayeredProvider::layered_info(self)
            }

            async fn handle_single_prompt(
                &self,
                prompt: &str,
                payload: &$crate::types::HandlerPayload,
            ) -> ::std::result::Result<$crate::types::PromptResponse, $crate::error::PromptError> {
                $crate::layer::LayeredProvider::layered_single_prompt(self, prompt, payload).await
            }

            async fn handle_continuous_prompt(
                &self,
                messages: &[$crate::types::PromptMessage],
                payload: &$crate::types::HandlerPayload,
            ) -> ::std::result::Result<$crate::types::PromptResponse, $crate::error::PromptError> {
                $crate::layer::LayeredProvider::layered_continuous_prompt(self, messages, payload)
                    .await
            }

            async fn handle_image_prompt(
                &self,
                prompt: &str,
                payload: &$crate::types::HandlerPayload,
            ) -> ::std::result::Result<$crate::types::PromptResponse, $crate::error::PromptError> {
                $crate::layer::LayeredProvider::layered_image_prompt(self, prompt, payload).await
            }
        }
    };
}

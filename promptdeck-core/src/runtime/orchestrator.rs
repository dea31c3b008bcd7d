//! ConversationOrchestrator implementation.
//!
//! Records one turn of a conversation: the user message, then the
//! provider's answer as an assistant message or a registered stream.

use crate::clock::{message_id, MessageClock};
use crate::ports::*;
use crate::runtime::dispatcher::{DispatchConfig, DispatchRequest, Dispatcher};
use crate::types::*;
use std::sync::Arc;

/// Builder for a [`ConversationOrchestrator`].
///
/// # Example
///
/// ```ignore
/// let orchestrator = ConversationOrchestrator::builder(registry, messages, settings, streams, errors)
///     .dispatch_config(DispatchConfig::new().with_system_role("You are terse."))
///     .finish();
/// ```
pub struct ConversationOrchestratorBuilder {
    providers: Arc<dyn ProviderRegistry>,
    messages: Arc<dyn MessageStore>,
    settings: Arc<dyn SettingsStore>,
    streams: Arc<dyn StreamRegistry>,
    errors: Arc<dyn ErrorChannel>,
    dispatch_config: DispatchConfig,
    clock: Option<Arc<MessageClock>>,
}

impl ConversationOrchestratorBuilder {
    /// Set the dispatcher configuration
    pub fn dispatch_config(mut self, config: DispatchConfig) -> Self {
        self.dispatch_config = config;
        self
    }

    /// Share a message clock, e.g. between orchestrators writing the same store
    pub fn clock(mut self, clock: Arc<MessageClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Finish building and create a ConversationOrchestrator
    pub fn finish(self) -> ConversationOrchestrator {
        ConversationOrchestrator {
            providers: self.providers,
            messages: self.messages,
            streams: self.streams,
            dispatcher: Dispatcher::new(self.settings, self.errors)
                .with_config(self.dispatch_config),
            clock: self.clock.unwrap_or_default(),
        }
    }
}

/// Entry point for submitting prompts.
///
/// Callers must serialize `handle_prompt` per conversation; two concurrent
/// turns on a non-continuous conversation race on the transcript clear.
pub struct ConversationOrchestrator {
    providers: Arc<dyn ProviderRegistry>,
    messages: Arc<dyn MessageStore>,
    streams: Arc<dyn StreamRegistry>,
    dispatcher: Dispatcher,
    clock: Arc<MessageClock>,
}

impl ConversationOrchestrator {
    /// Create a new builder
    pub fn builder(
        providers: Arc<dyn ProviderRegistry>,
        messages: Arc<dyn MessageStore>,
        settings: Arc<dyn SettingsStore>,
        streams: Arc<dyn StreamRegistry>,
        errors: Arc<dyn ErrorChannel>,
    ) -> ConversationOrchestratorBuilder {
        ConversationOrchestratorBuilder {
            providers,
            messages,
            settings,
            streams,
            errors,
            dispatch_config: DispatchConfig::default(),
            clock: None,
        }
    }

    /// Get reference to the dispatcher
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run one turn of `conversation` with `prompt`.
    ///
    /// Results are observed through the message store, the stream registry
    /// and the error channel; nothing is returned and nothing propagates.
    pub async fn handle_prompt(&self, conversation: &Conversation, prompt: impl Into<String>) {
        let Some(provider) = self.providers.lookup(&conversation.provider_id) else {
            tracing::debug!(
                conversation_id = %conversation.id,
                provider_id = %conversation.provider_id,
                "no provider bound to conversation, skipping prompt"
            );
            return;
        };

        if !conversation.conversation_type.retains_history() {
            self.messages.clear(&conversation.id);
        }

        let prompt = prompt.into();
        let created_at = self.clock.now_millis();
        self.messages.append(
            &conversation.id,
            Message {
                id: message_id(&conversation.id, Role::User, created_at),
                role: Role::User,
                content: prompt.clone(),
                is_streaming: false,
                created_at,
            },
        );

        let history = self.messages.get_all(&conversation.id);
        let response = self
            .dispatcher
            .dispatch(DispatchRequest {
                conversation,
                provider: provider.as_ref(),
                prompt: &prompt,
                history: &history,
            })
            .await;

        let created_at = self.clock.now_millis();
        let assistant_id = message_id(&conversation.id, Role::Assistant, created_at);

        let (content, is_streaming) = match response {
            PromptResponse::Text(text) => (text, false),
            PromptResponse::Stream(stream) => {
                self.streams.register(
                    &conversation.id,
                    StreamHandle {
                        message_id: assistant_id.clone(),
                        stream,
                    },
                );
                (String::new(), true)
            }
            PromptResponse::Empty => return,
        };

        tracing::debug!(
            conversation_id = %conversation.id,
            message_id = %assistant_id,
            is_streaming,
            "recorded assistant message"
        );

        self.messages.append(
            &conversation.id,
            Message {
                id: assistant_id,
                role: Role::Assistant,
                content,
                is_streaming,
                created_at,
            },
        );
    }
}

impl std::fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationOrchestrator")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

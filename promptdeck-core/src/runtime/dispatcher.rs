//! Dispatcher implementation.
//!
//! Selects the provider capability for a conversation's mode, invokes it
//! exactly once and converts every failure into a normalized
//! [`ErrorMessage`] published on the error channel.

use crate::error::{ErrorMessage, PromptError, DEFAULT_ERROR_CODE, DEFAULT_ERROR_MESSAGE};
use crate::ports::{ErrorChannel, SettingsStore};
use crate::provider::PromptProvider;
use crate::types::*;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    default_error_code: String,
    default_error_message: String,
    system_role: String,
}

impl DispatchConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            default_error_code: DEFAULT_ERROR_CODE.to_string(),
            default_error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            system_role: String::new(),
        }
    }

    /// Set the code published when a failure carries none
    pub fn with_default_error_code(mut self, code: impl Into<String>) -> Self {
        self.default_error_code = code.into();
        self
    }

    /// Set the message published when a failure carries none
    pub fn with_default_error_message(mut self, message: impl Into<String>) -> Self {
        self.default_error_message = message.into();
        self
    }

    /// Set the system role handed to providers
    pub fn with_system_role(mut self, system_role: impl Into<String>) -> Self {
        self.system_role = system_role.into();
        self
    }

    pub fn default_error_code(&self) -> &str {
        &self.default_error_code
    }

    pub fn default_error_message(&self) -> &str {
        &self.default_error_message
    }

    pub fn system_role(&self) -> &str {
        &self.system_role
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one dispatch needs
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    pub conversation: &'a Conversation,
    pub provider: &'a dyn PromptProvider,
    pub prompt: &'a str,
    /// Transcript including the user message of this turn
    pub history: &'a [Message],
}

/// Provider dispatcher.
///
/// Never returns an error: a failed invocation publishes to the error
/// channel and yields [`PromptResponse::Empty`].
pub struct Dispatcher {
    settings: Arc<dyn SettingsStore>,
    errors: Arc<dyn ErrorChannel>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(settings: Arc<dyn SettingsStore>, errors: Arc<dyn ErrorChannel>) -> Self {
        Self {
            settings,
            errors,
            config: DispatchConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Invoke the capability matching the conversation's mode
    pub async fn dispatch(&self, req: DispatchRequest<'_>) -> PromptResponse {
        let provider_info = req.provider.info();
        let payload = HandlerPayload::new(
            req.conversation.id.clone(),
            self.settings.global_settings(&provider_info.id),
        )
        .with_system_role(self.config.system_role.clone());

        let span = tracing::debug_span!(
            "dispatch",
            dispatch_id = %uuid::Uuid::new_v4(),
            conversation_id = %req.conversation.id,
            provider_id = %provider_info.id,
        );

        async move {
            tracing::debug!(?payload, "built handler payload");

            let Some(capability) = req.conversation.conversation_type.capability() else {
                // Unknown modes are not classified as errors
                tracing::debug!(
                    mode = ?req.conversation.conversation_type,
                    "no capability for conversation mode"
                );
                return PromptResponse::Empty;
            };

            let outcome = AssertUnwindSafe(invoke(capability, &req, &payload))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(response)) => {
                    tracing::debug!(%capability, kind = response.kind(), "provider responded");
                    response
                }
                Ok(Err(err)) => {
                    tracing::error!(%capability, error = %err, "provider hook failed");
                    self.report(&err);
                    PromptResponse::Empty
                }
                Err(panic) => {
                    let message = panic_message(&*panic)
                        .unwrap_or(self.config.default_error_message.as_str())
                        .to_string();
                    tracing::warn!(%capability, %message, "provider hook panicked");
                    self.errors.publish(ErrorMessage::new(
                        self.config.default_error_code.clone(),
                        message,
                    ));
                    PromptResponse::Empty
                }
            }
        }
        .instrument(span)
        .await
    }

    fn report(&self, err: &PromptError) {
        self.errors.publish(err.normalize(
            &self.config.default_error_code,
            &self.config.default_error_message,
        ));
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn invoke(
    capability: Capability,
    req: &DispatchRequest<'_>,
    payload: &HandlerPayload,
) -> Result<PromptResponse, PromptError> {
    match capability {
        Capability::SinglePrompt => req.provider.handle_single_prompt(req.prompt, payload).await,
        Capability::ContinuousPrompt => {
            let messages: Vec<PromptMessage> =
                req.history.iter().map(Message::to_prompt_message).collect();
            req.provider
                .handle_continuous_prompt(&messages, payload)
                .await
        }
        Capability::ImagePrompt => req.provider.handle_image_prompt(req.prompt, payload).await,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        return None;
    };

    Some(message).filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ErrorSlot;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FixedSettings;

    impl SettingsStore for FixedSettings {
        fn global_settings(&self, provider_id: &str) -> serde_json::Value {
            serde_json::json!({ "provider": provider_id, "model": "test-model" })
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        Text,
        Stream,
        Fail,
        FailCoded,
        Panic,
    }

    /// Records every hook call; the image hook is only served when enabled
    #[derive(Debug)]
    struct ScriptedProvider {
        behavior: Behavior,
        images: bool,
        calls: Mutex<Vec<(Capability, HandlerPayload)>>,
        seen_messages: Mutex<Vec<PromptMessage>>,
        seen_prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                images: false,
                calls: Mutex::new(Vec::new()),
                seen_messages: Mutex::new(Vec::new()),
                seen_prompts: Mutex::new(Vec::new()),
            }
        }

        fn with_images(mut self) -> Self {
            self.images = true;
            self
        }

        fn calls(&self) -> Vec<Capability> {
            self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
        }

        fn respond(
            &self,
            capability: Capability,
            payload: &HandlerPayload,
        ) -> Result<PromptResponse, PromptError> {
            self.calls
                .lock()
                .unwrap()
                .push((capability, payload.clone()));
            match self.behavior {
                Behavior::Text => Ok(PromptResponse::text(format!("answer from {capability}"))),
                Behavior::Stream => {
                    let chunks: Vec<Result<String, PromptError>> = vec![Ok("chunk".to_string())];
                    Ok(PromptResponse::stream(tokio_stream::iter(chunks)))
                }
                Behavior::Fail => Err(PromptError::provider("boom")),
                Behavior::FailCoded => Err(PromptError::coded("rate_limited", "slow down")),
                Behavior::Panic => panic!("provider exploded"),
            }
        }
    }

    #[async_trait]
    impl PromptProvider for ScriptedProvider {
        fn info(&self) -> Arc<ProviderInfo> {
            ProviderInfo::new("scripted", "Scripted")
        }

        async fn handle_single_prompt(
            &self,
            prompt: &str,
            payload: &HandlerPayload,
        ) -> Result<PromptResponse, PromptError> {
            self.seen_prompts.lock().unwrap().push(prompt.to_string());
            self.respond(Capability::SinglePrompt, payload)
        }

        async fn handle_continuous_prompt(
            &self,
            messages: &[PromptMessage],
            payload: &HandlerPayload,
        ) -> Result<PromptResponse, PromptError> {
            self.seen_messages
                .lock()
                .unwrap()
                .extend(messages.iter().cloned());
            self.respond(Capability::ContinuousPrompt, payload)
        }

        async fn handle_image_prompt(
            &self,
            prompt: &str,
            payload: &HandlerPayload,
        ) -> Result<PromptResponse, PromptError> {
            if !self.images {
                return Ok(PromptResponse::Empty);
            }
            self.seen_prompts.lock().unwrap().push(prompt.to_string());
            self.respond(Capability::ImagePrompt, payload)
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<ErrorSlot>) {
        let errors = Arc::new(ErrorSlot::new());
        let dispatcher = Dispatcher::new(Arc::new(FixedSettings), errors.clone());
        (dispatcher, errors)
    }

    fn message(id: &str, role: Role, content: &str) -> Message {
        Message {
            id: id.to_string(),
            role,
            content: content.to_string(),
            is_streaming: false,
            created_at: 1,
        }
    }

    #[tokio::test]
    async fn test_mode_selects_capability() {
        let (dispatcher, errors) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Text).with_images();

        for (mode, expected) in [
            (ConversationType::Single, Capability::SinglePrompt),
            (ConversationType::Continuous, Capability::ContinuousPrompt),
            (ConversationType::Image, Capability::ImagePrompt),
        ] {
            let conversation = Conversation::new("c1", "scripted", mode);
            let response = dispatcher
                .dispatch(DispatchRequest {
                    conversation: &conversation,
                    provider: &provider,
                    prompt: "hello",
                    history: &[],
                })
                .await;

            let expected_text = format!("answer from {expected}");
            assert!(matches!(response, PromptResponse::Text(ref text) if *text == expected_text));
            assert_eq!(provider.calls().last().copied(), Some(expected));
        }

        assert_eq!(provider.calls().len(), 3);
        assert!(errors.current().is_none());
    }

    #[tokio::test]
    async fn test_image_mode_passes_prompt_and_payload() {
        let (dispatcher, _) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Text).with_images();
        let conversation = Conversation::new("img", "scripted", ConversationType::Image);

        dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "a cat in a hat",
                history: &[],
            })
            .await;

        assert_eq!(*provider.seen_prompts.lock().unwrap(), vec!["a cat in a hat"]);
        let calls = provider.calls.lock().unwrap();
        let (capability, payload) = &calls[0];
        assert_eq!(*capability, Capability::ImagePrompt);
        assert_eq!(payload.conversation_id, "img");
        assert_eq!(payload.global_settings["model"], "test-model");
        assert!(provider.seen_messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let (dispatcher, _) = dispatcher();
        let config = dispatcher.config();
        assert_eq!(config.default_error_code(), DEFAULT_ERROR_CODE);
        assert_eq!(config.default_error_message(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(config.system_role(), "");

        let dispatcher = dispatcher.with_config(
            DispatchConfig::new()
                .with_default_error_code("upstream_error")
                .with_default_error_message("Something went wrong")
                .with_system_role("be brief"),
        );
        let config = dispatcher.config();
        assert_eq!(config.default_error_code(), "upstream_error");
        assert_eq!(config.default_error_message(), "Something went wrong");
        assert_eq!(config.system_role(), "be brief");
    }

    #[tokio::test]
    async fn test_payload_carries_settings_and_empty_defaults() {
        let (dispatcher, _) = dispatcher();
        let dispatcher = dispatcher.with_config(DispatchConfig::new().with_system_role("be brief"));
        let provider = ScriptedProvider::new(Behavior::Text);
        let conversation = Conversation::new("c9", "scripted", ConversationType::Single);

        dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        let calls = provider.calls.lock().unwrap();
        let (_, payload) = &calls[0];
        assert_eq!(payload.conversation_id, "c9");
        assert_eq!(payload.global_settings["provider"], "scripted");
        assert_eq!(payload.system_role, "be brief");
        assert!(payload.conversation_settings.is_empty());
        assert!(payload.mock_messages.is_empty());
    }

    #[tokio::test]
    async fn test_continuous_projects_history_in_order() {
        let (dispatcher, _) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Text);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Continuous);
        let history = vec![
            message("c1:user:1", Role::User, "first"),
            message("c1:assistant:2", Role::Assistant, "reply"),
            message("c1:user:3", Role::User, "second"),
        ];

        dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "second",
                history: &history,
            })
            .await;

        let seen = provider.seen_messages.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                PromptMessage::user("first"),
                PromptMessage::assistant("reply"),
                PromptMessage::user("second"),
            ]
        );

        let wire = serde_json::to_value(&seen[0]).unwrap();
        let keys: Vec<&String> = wire.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_capability_is_empty_without_error() {
        let (dispatcher, errors) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Text);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Image);

        let response = dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "a cat",
                history: &[],
            })
            .await;

        assert!(response.is_empty());
        assert!(provider.calls().is_empty());
        assert!(errors.current().is_none());
    }

    /// Unrecognized modes look exactly like a missing capability. Whether
    /// they should be a configuration error instead is still undecided.
    #[tokio::test]
    async fn test_unrecognized_mode_is_silently_empty() {
        let (dispatcher, errors) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Fail);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Unrecognized);

        let response = dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        assert!(response.is_empty());
        assert!(provider.calls().is_empty());
        assert!(errors.current().is_none());
    }

    #[tokio::test]
    async fn test_stream_response_passes_through() {
        let (dispatcher, _) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Stream);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Single);

        let response = dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        assert!(response.is_stream());
    }

    #[tokio::test]
    async fn test_coded_failure_is_published_verbatim() {
        let (dispatcher, errors) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::FailCoded);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Single);

        let response = dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        assert!(response.is_empty());
        assert_eq!(
            errors.current().as_deref(),
            Some(&ErrorMessage::new("rate_limited", "slow down"))
        );
    }

    #[tokio::test]
    async fn test_plain_failure_gets_default_code() {
        let (dispatcher, errors) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Fail);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Single);

        let response = dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        assert!(response.is_empty());
        assert_eq!(
            errors.current().as_deref(),
            Some(&ErrorMessage::new("provider_error", "boom"))
        );
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_panic_is_absorbed() {
        let (dispatcher, errors) = dispatcher();
        let provider = ScriptedProvider::new(Behavior::Panic);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Single);

        let response = dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        assert!(response.is_empty());
        assert_eq!(
            errors.current().as_deref(),
            Some(&ErrorMessage::new("provider_error", "provider exploded"))
        );
    }

    #[tokio::test]
    async fn test_configured_default_code() {
        let (dispatcher, errors) = dispatcher();
        let dispatcher =
            dispatcher.with_config(DispatchConfig::new().with_default_error_code("backend_down"));
        let provider = ScriptedProvider::new(Behavior::Fail);
        let conversation = Conversation::new("c1", "scripted", ConversationType::Single);

        dispatcher
            .dispatch(DispatchRequest {
                conversation: &conversation,
                provider: &provider,
                prompt: "hello",
                history: &[],
            })
            .await;

        assert_eq!(errors.current().unwrap().code, "backend_down");
    }
}

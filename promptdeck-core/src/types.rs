//! Core types for conversations, messages and provider responses.

use crate::error::PromptError;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Conversation mode
///
/// Decides which provider capability is invoked and whether the transcript
/// accumulates across turns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    Single,
    Continuous,
    Image,
    /// Any mode string this version does not know about
    #[serde(other)]
    Unrecognized,
}

impl ConversationType {
    /// Capability invoked for this mode, if any
    pub fn capability(self) -> Option<Capability> {
        match self {
            ConversationType::Single => Some(Capability::SinglePrompt),
            ConversationType::Continuous => Some(Capability::ContinuousPrompt),
            ConversationType::Image => Some(Capability::ImagePrompt),
            ConversationType::Unrecognized => None,
        }
    }

    /// Whether prior turns are kept in the transcript
    pub fn retains_history(self) -> bool {
        matches!(self, ConversationType::Continuous)
    }
}

/// Prompt-handling capability a provider may expose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SinglePrompt,
    ContinuousPrompt,
    ImagePrompt,
}

impl Capability {
    /// Name of the provider hook backing this capability
    pub fn hook_name(self) -> &'static str {
        match self {
            Capability::SinglePrompt => "handle_single_prompt",
            Capability::ContinuousPrompt => "handle_continuous_prompt",
            Capability::ImagePrompt => "handle_image_prompt",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hook_name())
    }
}

/// Conversation owned by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub provider_id: String,
    pub conversation_type: ConversationType,
}

impl Conversation {
    /// Create a new conversation bound to a provider
    pub fn new(
        id: impl Into<String>,
        provider_id: impl Into<String>,
        conversation_type: ConversationType,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            provider_id: provider_id.into(),
            conversation_type,
        }
    }

    /// Set the conversation name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transcript entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    /// Empty for streamed responses; their text arrives through the stream registry
    pub content: String,
    #[serde(default)]
    pub is_streaming: bool,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
}

impl Message {
    /// Project to the shape handed to continuous-prompt providers
    pub fn to_prompt_message(&self) -> PromptMessage {
        PromptMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Role and content only, as seen by a continuous-prompt provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    /// Create a new user message with text
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message with text
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Value object handed to every capability hook, built fresh per dispatch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandlerPayload {
    pub conversation_id: String,
    pub global_settings: serde_json::Value,
    pub conversation_settings: serde_json::Map<String, serde_json::Value>,
    pub system_role: String,
    pub mock_messages: Vec<PromptMessage>,
}

impl HandlerPayload {
    /// Create a payload with empty per-conversation defaults
    pub fn new(conversation_id: impl Into<String>, global_settings: serde_json::Value) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            global_settings,
            conversation_settings: serde_json::Map::new(),
            system_role: String::new(),
            mock_messages: Vec::new(),
        }
    }

    /// Set the system role
    pub fn with_system_role(mut self, system_role: impl Into<String>) -> Self {
        self.system_role = system_role.into();
        self
    }
}

/// Stream of text chunks produced by a provider
pub type PromptStream = dyn Stream<Item = Result<String, PromptError>> + Send + Unpin;

/// Response produced by a capability hook
pub enum PromptResponse {
    /// Complete textual answer
    Text(String),
    /// Lazily delivered answer
    Stream(Box<PromptStream>),
    /// Nothing produced
    Empty,
}

impl PromptResponse {
    /// Create a text response
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Create a stream response
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<String, PromptError>> + Send + Unpin + 'static,
    {
        Self::Stream(Box::new(stream))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PromptResponse::Empty)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, PromptResponse::Stream(_))
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            PromptResponse::Text(_) => "text",
            PromptResponse::Stream(_) => "stream",
            PromptResponse::Empty => "empty",
        }
    }
}

impl fmt::Debug for PromptResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptResponse::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PromptResponse::Stream(_) => f.write_str("Stream(..)"),
            PromptResponse::Empty => f.write_str("Empty"),
        }
    }
}

impl From<String> for PromptResponse {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

impl From<Option<String>> for PromptResponse {
    fn from(content: Option<String>) -> Self {
        content.map_or(Self::Empty, Self::Text)
    }
}

/// Live stream handed to the stream registry
pub struct StreamHandle {
    pub message_id: String,
    pub stream: Box<PromptStream>,
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("message_id", &self.message_id)
            .finish_non_exhaustive()
    }
}

/// Provider information
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
}

impl ProviderInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            name: name.into(),
        })
    }
}

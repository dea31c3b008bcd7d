//! Error types for prompt providers and their normalized form.

use serde::{Deserialize, Serialize};

/// Code used when a provider failure carries no structured cause.
pub const DEFAULT_ERROR_CODE: &str = "provider_error";

/// Message used when a provider failure carries no usable text at all.
pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Normalized error surfaced to the UI error channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
}

impl ErrorMessage {
    /// Create a new error message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Error raised by a provider capability hook.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Provider failure described only by a message
    #[error("{0}")]
    Provider(String),

    /// Provider failure carrying a structured `{code, message}` cause
    #[error("{}: {}", .0.code, .0.message)]
    Coded(ErrorMessage),

    /// Failure while producing a response stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else a provider wants to bubble up
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PromptError {
    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create an error with a structured cause
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Coded(ErrorMessage::new(code, message))
    }

    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Structured cause, if the error carries one
    pub fn cause(&self) -> Option<&ErrorMessage> {
        match self {
            PromptError::Coded(cause) => Some(cause),
            _ => None,
        }
    }

    /// The error's own message, without any variant prefix
    pub fn message(&self) -> String {
        match self {
            PromptError::Provider(msg) | PromptError::Stream(msg) => msg.clone(),
            PromptError::Coded(cause) => cause.message.clone(),
            PromptError::Serialization(err) => err.to_string(),
            PromptError::Other(err) => err.to_string(),
        }
    }

    /// Normalize into the `{code, message}` shape.
    ///
    /// Non-empty cause fields win, then the error's own message, then the
    /// supplied defaults.
    pub fn normalize(&self, default_code: &str, default_message: &str) -> ErrorMessage {
        let cause = self.cause();

        let code = cause
            .map(|c| c.code.as_str())
            .filter(|code| !code.is_empty())
            .unwrap_or(default_code);

        let message = cause
            .map(|c| c.message.clone())
            .filter(|msg| !msg.is_empty())
            .or_else(|| Some(self.message()).filter(|msg| !msg.is_empty()))
            .unwrap_or_else(|| default_message.to_string());

        ErrorMessage::new(code, message)
    }
}

impl From<String> for PromptError {
    fn from(s: String) -> Self {
        Self::Provider(s)
    }
}

impl From<&str> for PromptError {
    fn from(s: &str) -> Self {
        Self::Provider(s.to_string())
    }
}

impl From<ErrorMessage> for PromptError {
    fn from(cause: ErrorMessage) -> Self {
        Self::Coded(cause)
    }
}

//! Contracts for the collaborators the orchestrator and dispatcher depend on.
//!
//! Storage, settings and UI plumbing live outside this crate; these traits
//! are the only surface the core touches.

use crate::error::ErrorMessage;
use crate::provider::PromptProvider;
use crate::types::{Message, StreamHandle};
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// Resolves the provider a conversation is bound to.
pub trait ProviderRegistry: Send + Sync {
    fn lookup(&self, provider_id: &str) -> Option<Arc<dyn PromptProvider>>;
}

/// Ordered per-conversation transcript.
pub trait MessageStore: Send + Sync {
    fn clear(&self, conversation_id: &str);

    /// Messages in insertion order
    fn get_all(&self, conversation_id: &str) -> Vec<Message>;

    fn append(&self, conversation_id: &str, message: Message);
}

/// Resolved per-provider settings.
pub trait SettingsStore: Send + Sync {
    /// `Value::Null` when nothing is configured
    fn global_settings(&self, provider_id: &str) -> serde_json::Value;
}

/// Hands live response streams to whoever renders them.
pub trait StreamRegistry: Send + Sync {
    fn register(&self, conversation_id: &str, handle: StreamHandle);
}

/// UI error channel with a single current value.
pub trait ErrorChannel: Send + Sync {
    fn publish(&self, error: ErrorMessage);
}

/// Single-slot error mailbox: the last published error wins.
#[derive(Debug, Default)]
pub struct ErrorSlot {
    current: ArcSwapOption<ErrorMessage>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current error, if any
    pub fn current(&self) -> Option<Arc<ErrorMessage>> {
        self.current.load_full()
    }

    /// Read and clear the current error
    pub fn take(&self) -> Option<Arc<ErrorMessage>> {
        self.current.swap(None)
    }

    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl ErrorChannel for ErrorSlot {
    fn publish(&self, error: ErrorMessage) {
        self.current.store(Some(Arc::new(error)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_slot_last_write_wins() {
        let slot = ErrorSlot::new();
        assert!(slot.current().is_none());

        slot.publish(ErrorMessage::new("provider_error", "first"));
        slot.publish(ErrorMessage::new("rate_limited", "second"));

        assert_eq!(
            slot.current().as_deref(),
            Some(&ErrorMessage::new("rate_limited", "second"))
        );
    }

    #[test]
    fn test_error_slot_take_clears() {
        let slot = ErrorSlot::new();
        slot.publish(ErrorMessage::new("provider_error", "boom"));

        assert_eq!(slot.take().unwrap().message, "boom");
        assert!(slot.take().is_none());
        assert!(slot.current().is_none());
    }
}

//! Live response streams awaiting a consumer.

use dashmap::DashMap;
use promptdeck_core::ports::StreamRegistry;
use promptdeck_core::types::StreamHandle;
use std::sync::Mutex;

/// One live stream slot per conversation.
///
/// Registering replaces any stream the consumer has not picked up yet;
/// this registry never polls or cancels a stream itself. Streams are only
/// `Send`, so each slot sits behind a mutex to keep the registry `Sync`.
#[derive(Debug, Default)]
pub struct InMemoryStreamRegistry {
    streams: DashMap<String, Mutex<StreamHandle>>,
}

impl InMemoryStreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the conversation's stream to a consumer
    pub fn take(&self, conversation_id: &str) -> Option<StreamHandle> {
        self.streams
            .remove(conversation_id)
            .map(|(_, slot)| {
                slot.into_inner()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
            })
    }

    /// Message id of the pending stream, if any
    pub fn pending_message_id(&self, conversation_id: &str) -> Option<String> {
        self.streams
            .get(conversation_id)
            .map(|entry| match entry.value().lock() {
                Ok(handle) => handle.message_id.clone(),
                Err(poisoned) => poisoned.into_inner().message_id.clone(),
            })
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        self.streams.contains_key(conversation_id)
    }
}

impl StreamRegistry for InMemoryStreamRegistry {
    fn register(&self, conversation_id: &str, handle: StreamHandle) {
        let slot = Mutex::new(handle);
        if let Some(previous) = self.streams.insert(conversation_id.to_string(), slot) {
            let previous = previous
                .into_inner()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            tracing::warn!(
                conversation_id,
                message_id = %previous.message_id,
                "replacing stream that was never consumed"
            );
        }
    }
}

//! Conversation transcripts.

use dashmap::DashMap;
use promptdeck_core::ports::MessageStore;
use promptdeck_core::types::Message;

/// Transcript store keyed by conversation id
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    conversations: DashMap<String, Vec<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages recorded for a conversation
    pub fn len(&self, conversation_id: &str) -> usize {
        self.conversations
            .get(conversation_id)
            .map_or(0, |messages| messages.len())
    }

    pub fn is_empty(&self, conversation_id: &str) -> bool {
        self.len(conversation_id) == 0
    }

    /// Update a message in place, e.g. once its stream has been drained.
    ///
    /// Returns false when no message has that id.
    pub fn update<F>(&self, conversation_id: &str, message_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        let Some(mut messages) = self.conversations.get_mut(conversation_id) else {
            return false;
        };

        match messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                f(message);
                true
            }
            None => false,
        }
    }
}

impl MessageStore for InMemoryMessageStore {
    fn clear(&self, conversation_id: &str) {
        self.conversations.remove(conversation_id);
    }

    fn get_all(&self, conversation_id: &str) -> Vec<Message> {
        self.conversations
            .get(conversation_id)
            .map(|messages| messages.value().clone())
            .unwrap_or_default()
    }

    fn append(&self, conversation_id: &str, message: Message) {
        self.conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(message);
    }
}

//! Monotonic timestamps for message ids.

use crate::types::Role;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing millisecond timestamps.
///
/// Follows wall-clock time, but never repeats a value: two messages created
/// within the same millisecond get consecutive timestamps, so their ids stay
/// distinct.
#[derive(Debug, Default)]
pub struct MessageClock {
    last: AtomicU64,
}

impl MessageClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp, in milliseconds since the Unix epoch
    pub fn now_millis(&self) -> u64 {
        let wall = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();

        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(wall.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        wall.max(previous + 1)
    }
}

/// Build a message id of the form `{conversation_id}:{role}:{timestamp}`
pub fn message_id(conversation_id: &str, role: Role, timestamp: u64) -> String {
    format!("{}:{}:{}", conversation_id, role, timestamp)
}

//! # Promptdeck Core
//!
//! Core abstractions and runtime for routing prompts to pluggable providers.
//!
//! This crate provides the provider capability trait, the collaborator
//! contracts (provider registry, message store, settings, stream registry,
//! error channel), and the runtime that dispatches a prompt and records the
//! resulting conversation turn.

pub mod clock;
pub mod error;
pub mod layer;
pub mod ports;
pub mod provider;
pub mod runtime;
pub mod types;

// Re-exports
pub use clock::MessageClock;
pub use error::{ErrorMessage, PromptError};
pub use layer::{Layer, LayeredProvider};
pub use ports::{
    ErrorChannel, ErrorSlot, MessageStore, ProviderRegistry, SettingsStore, StreamRegistry,
};
pub use provider::PromptProvider;
pub use runtime::{ConversationOrchestrator, DispatchConfig, DispatchRequest, Dispatcher};
pub use types::*;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, PromptError>;

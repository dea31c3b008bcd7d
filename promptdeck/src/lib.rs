//! # Promptdeck
//!
//! Route a user prompt to a pluggable provider and keep the conversation
//! transcript.
//!
//! A provider exposes up to three optional capabilities (single prompt,
//! continuous chat, image generation). The conversation's mode decides which
//! one is invoked. Whatever comes back, whether plain text, a lazy stream or
//! nothing, is normalized into a uniform [`Message`]. Provider failures never
//! escape: they become a `{code, message}` [`ErrorMessage`] on the error
//! channel.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! promptdeck = { version = "0.1", features = ["layers", "stores"] }
//! ```
//!
//! ```ignore
//! use promptdeck::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(my_provider: impl PromptProvider) {
//! let providers = Arc::new(InMemoryProviderRegistry::new());
//! providers.register("echo", LoggingLayer::new().layer(my_provider));
//!
//! let messages = Arc::new(InMemoryMessageStore::new());
//! let errors = Arc::new(ErrorSlot::new());
//! let orchestrator = ConversationOrchestrator::builder(
//!     providers,
//!     messages.clone(),
//!     Arc::new(InMemorySettingsStore::new()),
//!     Arc::new(InMemoryStreamRegistry::new()),
//!     errors.clone(),
//! )
//! .finish();
//!
//! let conversation = Conversation::new("c1", "echo", ConversationType::Continuous);
//! orchestrator.handle_prompt(&conversation, "What is Rust?").await;
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: `layers` and `stores`
//! - `layers`: Built-in provider layers (logging)
//! - `stores`: In-memory provider registry, message, settings and stream stores
//! - `full`: All features enabled

// Re-export core types and traits
pub use promptdeck_core::*;

// Re-export layers under `layers` module
#[cfg(feature = "promptdeck-layer")]
pub mod layers {
    //! Built-in provider layers.
    pub use promptdeck_layer::*;
}

// Re-export stores under `store` module
#[cfg(feature = "promptdeck-store")]
pub mod store {
    //! In-memory registries and stores.
    pub use promptdeck_store::*;
}

// Convenience re-exports at root level for common types
pub use promptdeck_core::{
    error::{ErrorMessage, PromptError},
    layer::{Layer, LayeredProvider},
    ports::{
        ErrorChannel, ErrorSlot, MessageStore, ProviderRegistry, SettingsStore, StreamRegistry,
    },
    provider::PromptProvider,
    runtime::{ConversationOrchestrator, DispatchConfig, Dispatcher},
    types::{
        Capability, Conversation, ConversationType, HandlerPayload, Message, PromptMessage,
        PromptResponse, PromptStream, ProviderInfo, Role, StreamHandle,
    },
    Result,
};

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude module containing the most commonly used types and traits.
    //!
    //! ```
    //! use promptdeck::prelude::*;
    //! ```

    pub use crate::{
        Conversation, ConversationOrchestrator, ConversationType, DispatchConfig, ErrorChannel,
        ErrorMessage, ErrorSlot, HandlerPayload, Layer, Message, MessageStore, PromptError,
        PromptMessage, PromptProvider, PromptResponse, ProviderInfo, ProviderRegistry, Result,
        Role, SettingsStore, StreamRegistry,
    };

    #[cfg(feature = "promptdeck-layer")]
    pub use crate::layers::*;

    #[cfg(feature = "promptdeck-store")]
    pub use crate::store::*;
}

//! # Promptdeck Stores
//!
//! In-memory implementations of the collaborator contracts the
//! orchestrator depends on. Every store is a `DashMap` keyed by provider or
//! conversation id, so one instance can be shared behind an `Arc`.

pub mod messages;
pub mod providers;
pub mod settings;
pub mod streams;

// Re-exports
pub use messages::InMemoryMessageStore;
pub use providers::InMemoryProviderRegistry;
pub use settings::InMemorySettingsStore;
pub use streams::InMemoryStreamRegistry;

//! Runtime layer for Promptdeck.
//!
//! Two components, called top to bottom:
//! - [`ConversationOrchestrator`] records the user turn, asks the dispatcher
//!   for an answer and records the assistant turn (or registers its stream).
//! - [`Dispatcher`] picks the provider capability for the conversation's mode,
//!   invokes it once and absorbs any failure into the error channel.

pub mod dispatcher;
pub mod orchestrator;

pub use dispatcher::{DispatchConfig, DispatchRequest, Dispatcher};
pub use orchestrator::{ConversationOrchestrator, ConversationOrchestratorBuilder};

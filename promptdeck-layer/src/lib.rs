//! # Promptdeck Layers
//!
//! Built-in layers for Promptdeck providers.
//!
//! Currently implemented layers:
//! - `LoggingLayer`: Logs every capability hook with timing information and
//!   accounts for streamed chunks once a stream finishes
//!
//! ## Usage
//!
//! ```ignore
//! use promptdeck_core::Layer;
//! use promptdeck_layer::LoggingLayer;
//!
//! let provider = LoggingLayer::new().layer(my_provider);
//! registry.register("my-provider", provider);
//! ```

pub mod logging;

// Re-exports
pub use logging::{LoggedStream, LoggingLayer, LoggingProvider};

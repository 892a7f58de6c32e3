//! # textfmt-core
//!
//! Error types, settings, and logging for textfmt.
//! This crate has no dependency on the formatter engine and provides the
//! foundation the other crates build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Engine configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FormatError, FormatResult};
pub use settings::FormatSettings;

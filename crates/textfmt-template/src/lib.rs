//! # textfmt-template
//!
//! The formatter engine for textfmt: a C printf-style directive grammar and a
//! Python-style brace grammar behind one [`Formatter`](formatter::Formatter)
//! abstraction, chained by an [`Engine`](engine::Engine).
//!
//! ## Modules
//!
//! - [`value`] - The tagged argument model
//! - [`formatter`] - The formatter capability trait
//! - [`directives`] - C-style directive sub-parsers
//! - [`cstyle`] - The C printf-style formatter
//! - [`transformers`] - Placeholder transformers
//! - [`pystyle`] - The Python-style brace formatter
//! - [`engine`] - The format orchestrator

pub mod cstyle;
pub mod directives;
pub mod engine;
pub mod formatter;
pub mod pystyle;
pub mod transformers;
pub mod value;

pub use cstyle::CStyleFormatter;
pub use directives::{CustomDirectiveParser, DirectiveMatch, DirectiveParser};
pub use engine::Engine;
pub use formatter::{Formatted, Formatter};
pub use pystyle::{IndexingMode, PyStyleFormatter};
pub use transformers::{JsonTransformer, Transformer};
pub use value::FormatValue;

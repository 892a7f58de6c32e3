//! The formatter capability interface.
//!
//! A [`Formatter`] is one template grammar. The [`Engine`](crate::engine::Engine)
//! chains formatters over a single input string; each reports whether it
//! matched anything and what the string looks like afterwards.

use textfmt_core::error::{FormatError, FormatResult};

use crate::directives::DirectiveParser;
use crate::transformers::Transformer;
use crate::value::FormatValue;

/// The result of running one formatter over an input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    /// Whether at least one directive or placeholder was processed.
    pub matched: bool,
    /// The (possibly unchanged) output string.
    pub output: String,
}

impl Formatted {
    /// A result reporting that the formatter did not match.
    pub fn unmatched(input: &str) -> Self {
        Self {
            matched: false,
            output: input.to_string(),
        }
    }

    /// A result reporting a match with the given output.
    pub fn matched(output: impl Into<String>) -> Self {
        Self {
            matched: true,
            output: output.into(),
        }
    }
}

/// A template grammar that can be registered with an
/// [`Engine`](crate::engine::Engine).
///
/// Registry operations default to `UnsupportedOperation`, so a formatter only
/// overrides the capabilities it actually has.
pub trait Formatter: Send + Sync {
    /// Returns the formatter name. Names are unique within an engine.
    fn name(&self) -> &str;

    /// Whether directive parsers can be added or removed.
    fn supports_directive_parsers(&self) -> bool {
        false
    }

    /// Registers a directive parser at the end of the scan order.
    fn add_directive_parser(&mut self, _parser: Box<dyn DirectiveParser>) -> FormatResult<()> {
        Err(FormatError::unsupported(self.name(), "directive parsers"))
    }

    /// Returns whether a directive parser with this name is registered.
    fn has_directive_parser(&self, _name: &str) -> FormatResult<bool> {
        Err(FormatError::unsupported(self.name(), "directive parsers"))
    }

    /// Removes the directive parser with this name.
    fn remove_directive_parser(&mut self, _name: &str) -> FormatResult<()> {
        Err(FormatError::unsupported(self.name(), "directive parsers"))
    }

    /// Whether transformers can be added or removed.
    fn supports_transformers(&self) -> bool {
        false
    }

    /// Registers a transformer under `key`.
    fn add_transformer(&mut self, _key: &str, _transformer: Box<dyn Transformer>) -> FormatResult<()> {
        Err(FormatError::unsupported(self.name(), "transformers"))
    }

    /// Returns whether a transformer is registered under `key`.
    fn has_transformer(&self, _key: &str) -> FormatResult<bool> {
        Err(FormatError::unsupported(self.name(), "transformers"))
    }

    /// Removes the transformer registered under `key`.
    fn remove_transformer(&mut self, _key: &str) -> FormatResult<()> {
        Err(FormatError::unsupported(self.name(), "transformers"))
    }

    /// Formats `input` with the positional `args`.
    ///
    /// Any error aborts the whole call; no partial output is returned.
    fn format(&self, input: &str, args: &[FormatValue]) -> FormatResult<Formatted>;
}

//! The format orchestrator.
//!
//! An [`Engine`] holds an ordered chain of [`Formatter`]s. Formatting a
//! template runs the chain in registration order: by default the first
//! formatter that matches wins; in multi-formatter mode every formatter runs
//! over the output of the previous one.
//!
//! Multi-formatter mode lets a later formatter re-interpret text inserted by
//! an earlier one. With the default chain, an argument containing `%5s` that
//! the Python-style formatter substitutes is then padded by the C-style
//! formatter. Only enable it for templates and arguments you trust.
//!
//! ```
//! use textfmt_template::engine::Engine;
//! use textfmt_template::value::FormatValue;
//!
//! let engine = Engine::with_defaults();
//! let out = engine.format("{0} has {1} points", &["Ann".into(), 12.into()]).unwrap();
//! assert_eq!(out, "Ann has 12 points");
//! let out = engine.format("%-6s|", &[FormatValue::from("Ann")]).unwrap();
//! assert_eq!(out, "Ann   |");
//! ```

use std::fmt;

use textfmt_core::error::{FormatError, FormatResult};
use textfmt_core::settings::FormatSettings;

use crate::cstyle::{CStyleFormatter, C_STYLE_FORMATTER};
use crate::formatter::Formatter;
use crate::pystyle::{PyStyleFormatter, PY_STYLE_FORMATTER};
use crate::value::FormatValue;

/// Creates a built-in formatter by its registered name.
pub fn builtin_formatter(name: &str) -> FormatResult<Box<dyn Formatter>> {
    match name {
        PY_STYLE_FORMATTER => Ok(Box::new(PyStyleFormatter::new())),
        C_STYLE_FORMATTER => Ok(Box::new(CStyleFormatter::new())),
        other => Err(FormatError::ConfigurationError(format!(
            "unknown formatter '{other}'"
        ))),
    }
}

/// The format orchestrator: an ordered, uniquely named formatter chain.
pub struct Engine {
    formatters: Vec<Box<dyn Formatter>>,
    multi_formatter_mode: bool,
}

impl Engine {
    /// Creates an engine with no formatters.
    pub fn new() -> Self {
        Self {
            formatters: Vec::new(),
            multi_formatter_mode: false,
        }
    }

    /// Creates an engine with the Python-style formatter followed by the
    /// C-style formatter.
    pub fn with_defaults() -> Self {
        Self {
            formatters: vec![
                Box::new(PyStyleFormatter::new()),
                Box::new(CStyleFormatter::new()),
            ],
            multi_formatter_mode: false,
        }
    }

    /// Builds the formatter chain and mode from settings.
    pub fn from_settings(settings: &FormatSettings) -> FormatResult<Self> {
        let mut engine = Self::new();
        for name in &settings.formatters {
            engine.add_formatter(builtin_formatter(name)?)?;
        }
        engine.set_multi_formatter_mode(settings.multi_formatter_mode);
        Ok(engine)
    }

    /// Appends a formatter to the end of the chain.
    pub fn add_formatter(&mut self, formatter: Box<dyn Formatter>) -> FormatResult<()> {
        if self.has_formatter(formatter.name()) {
            return Err(FormatError::duplicate("Formatter", formatter.name()));
        }
        tracing::debug!(formatter = formatter.name(), "registered formatter");
        self.formatters.push(formatter);
        Ok(())
    }

    /// Removes the formatter with this name.
    pub fn remove_formatter(&mut self, name: &str) -> FormatResult<()> {
        let idx = self
            .formatters
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| FormatError::not_found("Formatter", name))?;
        self.formatters.remove(idx);
        tracing::debug!(formatter = name, "removed formatter");
        Ok(())
    }

    /// Returns whether a formatter with this name is registered.
    pub fn has_formatter(&self, name: &str) -> bool {
        self.formatters.iter().any(|f| f.name() == name)
    }

    /// Looks up a registered formatter.
    pub fn formatter(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters
            .iter()
            .find(|f| f.name() == name)
            .map(|f| &**f)
    }

    /// Looks up a registered formatter for registry changes.
    ///
    /// ```
    /// use textfmt_template::engine::Engine;
    ///
    /// let mut engine = Engine::with_defaults();
    /// let c_style = engine.formatter_mut("CStyleFormatter").unwrap();
    /// c_style.remove_directive_parser("hex-parser").unwrap();
    /// assert_eq!(engine.format("%x", &[255.into()]).unwrap(), "%x");
    /// ```
    pub fn formatter_mut(&mut self, name: &str) -> Option<&mut (dyn Formatter + 'static)> {
        self.formatters
            .iter_mut()
            .find(|f| f.name() == name)
            .map(|f| &mut **f)
    }

    /// Returns the formatter names in chain order.
    pub fn formatter_names(&self) -> Vec<&str> {
        self.formatters.iter().map(|f| f.name()).collect()
    }

    /// Enables or disables multi-formatter mode.
    pub fn set_multi_formatter_mode(&mut self, enabled: bool) {
        self.multi_formatter_mode = enabled;
    }

    /// Returns whether multi-formatter mode is enabled.
    pub const fn is_multi_formatter_mode(&self) -> bool {
        self.multi_formatter_mode
    }

    /// Formats `template` with the positional `args`.
    ///
    /// Returns the template unchanged if no formatter matches. The first
    /// error from any formatter aborts the call.
    pub fn format(&self, template: &str, args: &[FormatValue]) -> FormatResult<String> {
        let mut result = template.to_string();
        for formatter in &self.formatters {
            let formatted = formatter.format(&result, args)?;
            tracing::trace!(
                formatter = formatter.name(),
                matched = formatted.matched,
                "formatter finished"
            );
            if formatted.matched {
                result = formatted.output;
                if !self.multi_formatter_mode {
                    break;
                }
            }
        }
        Ok(result)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("formatters", &self.formatter_names())
            .field("multi_formatter_mode", &self.multi_formatter_mode)
            .finish()
    }
}

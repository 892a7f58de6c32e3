//! The C printf-style formatter.
//!
//! [`CStyleFormatter`] consumes one argument per directive, left to right:
//!
//! ```text
//! %[flags][width][.precision]type
//! ```
//!
//! Directive bodies are dispatched to an ordered registry of
//! [`DirectiveParser`]s; the first parser whose pattern matches the body
//! wins. Scanning resumes after each substitution, so text inserted by one
//! directive is never mistaken for another.
//!
//! ```
//! use textfmt_template::cstyle::CStyleFormatter;
//! use textfmt_template::formatter::Formatter;
//! use textfmt_template::value::FormatValue;
//!
//! let formatter = CStyleFormatter::new();
//! let result = formatter
//!     .format("%05d|%-5.4s|%x", &[123.into(), "abcde".into(), 255.into()])
//!     .unwrap();
//! assert!(result.matched);
//! assert_eq!(result.output, "00123|abcd |ff");
//! ```

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use textfmt_core::error::{FormatError, FormatResult};
use textfmt_core::logging::format_span;

use crate::directives::{default_parsers, DirectiveMatch, DirectiveParser};
use crate::formatter::{Formatted, Formatter};
use crate::value::FormatValue;

/// The registered name of [`CStyleFormatter`].
pub const C_STYLE_FORMATTER: &str = textfmt_core::settings::C_STYLE_FORMATTER;

/// `%` followed by flag, width and precision characters and one type letter.
static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([.#0-9\-]*[a-zA-Z])").expect("valid regex"));

/// The C printf-style formatter.
pub struct CStyleFormatter {
    parsers: Vec<Box<dyn DirectiveParser>>,
}

impl CStyleFormatter {
    /// Creates a formatter with the built-in directive parsers.
    pub fn new() -> Self {
        Self {
            parsers: default_parsers(),
        }
    }

    /// Creates a formatter with no directive parsers registered.
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Returns the registered parser names in scan order.
    pub fn parser_names(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Finds the first directive at or after byte `from`.
    ///
    /// Returns the span of the whole directive and the span of its body.
    fn next_directive(line: &str, from: usize) -> Option<(Range<usize>, Range<usize>)> {
        let rest = line.get(from..)?;
        let caps = DIRECTIVE_RE.captures(rest)?;
        let whole = caps.get(0)?;
        let body = caps.get(1)?;
        Some((
            from + whole.start()..from + whole.end(),
            from + body.start()..from + body.end(),
        ))
    }
}

impl Default for CStyleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CStyleFormatter {
    fn name(&self) -> &str {
        C_STYLE_FORMATTER
    }

    fn supports_directive_parsers(&self) -> bool {
        true
    }

    fn add_directive_parser(&mut self, parser: Box<dyn DirectiveParser>) -> FormatResult<()> {
        if self.parsers.iter().any(|p| p.name() == parser.name()) {
            return Err(FormatError::duplicate("Format parser", parser.name()));
        }
        tracing::debug!(parser = parser.name(), "registered directive parser");
        self.parsers.push(parser);
        Ok(())
    }

    fn has_directive_parser(&self, name: &str) -> FormatResult<bool> {
        Ok(self.parsers.iter().any(|p| p.name() == name))
    }

    fn remove_directive_parser(&mut self, name: &str) -> FormatResult<()> {
        let idx = self
            .parsers
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| FormatError::not_found("Format parser", name))?;
        self.parsers.remove(idx);
        tracing::debug!(parser = name, "removed directive parser");
        Ok(())
    }

    fn format(&self, input: &str, args: &[FormatValue]) -> FormatResult<Formatted> {
        let span = format_span(self.name());
        let _guard = span.enter();

        let mut line = input.to_string();
        let mut cursor = 0;
        let mut matched = false;

        for arg in args {
            let Some((range, body_range)) = Self::next_directive(&line, cursor) else {
                break;
            };
            let body = &line[body_range];

            let found = self.parsers.iter().find_map(|parser| {
                DirectiveMatch::from_pattern(parser.pattern(), body, range.clone())
                    .map(|directive| (parser, directive))
            });
            let Some((parser, directive)) = found else {
                tracing::debug!(directive = body, "no parser for directive, leaving it as is");
                cursor = range.end;
                continue;
            };

            tracing::trace!(parser = parser.name(), directive = body, "substituting directive");
            let replaced = parser.substitute(&directive, &line, arg)?;

            // Resume right after the substituted text.
            let mut next = (range.end + replaced.len())
                .saturating_sub(line.len())
                .min(replaced.len());
            while !replaced.is_char_boundary(next) {
                next += 1;
            }
            cursor = next;
            line = replaced;
            matched = true;
        }

        Ok(if matched {
            Formatted::matched(line)
        } else {
            Formatted::unmatched(input)
        })
    }
}

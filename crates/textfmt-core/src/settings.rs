//! Settings for textfmt.
//!
//! [`FormatSettings`] is an explicit, constructed configuration object: the
//! host builds one (by hand or through
//! [`settings_loader`](crate::settings_loader)) and passes it to whatever
//! needs it. There is no process-wide instance, so tests and independent
//! engines never share configuration.

use serde::{Deserialize, Serialize};

/// Name of the built-in Python-style formatter.
pub const PY_STYLE_FORMATTER: &str = "PyStyleFormatter";

/// Name of the built-in C-style formatter.
pub const C_STYLE_FORMATTER: &str = "CStyleFormatter";

/// The complete set of textfmt settings.
///
/// # Examples
///
/// ```
/// use textfmt_core::settings::FormatSettings;
///
/// let settings = FormatSettings::default();
/// assert!(!settings.multi_formatter_mode);
/// assert_eq!(settings.formatters, vec!["PyStyleFormatter", "CStyleFormatter"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSettings {
    // ── Logging ──────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty rather than JSON log output).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "textfmt_template=trace").
    pub log_level: String,

    // ── Engine ───────────────────────────────────────────────────────

    /// Run every formatter in sequence instead of stopping at the first match.
    ///
    /// Later formatters see the output of earlier ones, so an argument that
    /// contains another grammar's syntax is re-interpreted. Only enable this
    /// when arguments are trusted.
    pub multi_formatter_mode: bool,
    /// Formatter chain, by name, in precedence order.
    pub formatters: Vec<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            // Logging
            debug: false,
            log_level: "info".to_string(),

            // Engine
            multi_formatter_mode: false,
            formatters: vec![
                PY_STYLE_FORMATTER.to_string(),
                C_STYLE_FORMATTER.to_string(),
            ],
        }
    }
}

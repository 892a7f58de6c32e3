//! Logging integration for textfmt.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`FormatSettings`](crate::settings::FormatSettings) and for creating
//! per-formatter spans.

use tracing_subscriber::EnvFilter;

use crate::settings::FormatSettings;

/// Crates whose events a bare level such as `"debug"` applies to.
const FORMATTER_TARGETS: [&str; 3] = ["textfmt", "textfmt_core", "textfmt_template"];

/// Builds the event filter for `settings.log_level`.
///
/// A bare level (`"trace"`, `"debug"`, ...) applies to the textfmt crates
/// while everything else stays at `warn`. Any other value is used as a full
/// `EnvFilter` directive string. An invalid value falls back to `info` for
/// the textfmt crates.
pub fn log_filter(settings: &FormatSettings) -> EnvFilter {
    let level = settings.log_level.trim();
    let directives = if is_bare_level(level) {
        scoped_directives(level)
    } else {
        level.to_string()
    };
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(scoped_directives("info")))
}

fn is_bare_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

fn scoped_directives(level: &str) -> String {
    FORMATTER_TARGETS
        .iter()
        .fold("warn".to_string(), |acc, target| format!("{acc},{target}={level}"))
}

/// Installs the global tracing subscriber described by `settings`.
///
/// Debug mode writes pretty, multi-line events with source locations;
/// otherwise events are JSON lines carrying the current formatter span.
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is kept.
pub fn setup_logging(settings: &FormatSettings) -> bool {
    let filter = log_filter(settings);
    let installed = if settings.debug {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init()
    };
    installed.is_ok()
}

/// Creates a tracing span for one formatter invocation.
///
/// # Examples
///
/// ```
/// use textfmt_core::logging::format_span;
///
/// let span = format_span("CStyleFormatter");
/// let _guard = span.enter();
/// tracing::trace!("scanning for directives");
/// ```
pub fn format_span(formatter: &str) -> tracing::Span {
    tracing::trace_span!("format", formatter = formatter)
}

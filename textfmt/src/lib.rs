//! # textfmt
//!
//! Runtime string templating with two interchangeable grammars: C printf-style
//! directives (`%d`, `%05d`, `%.2f`, ...) and Python-style placeholders (`{}`,
//! `{0}`, `{a.b.c|json}`).
//!
//! This is the facade crate that re-exports the sub-crates. Depend on
//! `textfmt` to get everything, or on `textfmt-core` / `textfmt-template`
//! for finer-grained control.
//!
//! ```
//! use textfmt::prelude::*;
//!
//! let engine = Engine::with_defaults();
//! let greeting = "Hello {0.name}, you are {0.age}".format_with(&engine, &[
//!     serde_json::json!({"name": "Ann", "age": 31}).into(),
//! ]);
//! assert_eq!(greeting.unwrap(), "Hello Ann, you are 31");
//! ```

use std::fmt::Display;

/// Errors, settings and logging.
pub use textfmt_core as core;

/// Formatters, directive parsers, transformers and the engine.
pub use textfmt_template as template;

/// JSON values convert into [`FormatValue`](template::value::FormatValue).
pub use serde_json;

/// The logging facade used by every formatter.
pub use tracing;

/// The most commonly used types.
pub mod prelude {
    pub use textfmt_core::error::{FormatError, FormatResult};
    pub use textfmt_core::settings::FormatSettings;
    pub use textfmt_template::engine::Engine;
    pub use textfmt_template::formatter::{Formatted, Formatter};
    pub use textfmt_template::value::FormatValue;

    pub use crate::Formattable;
}

use textfmt_core::error::FormatResult;
use textfmt_core::settings::FormatSettings;
use textfmt_template::engine::Engine;
use textfmt_template::value::FormatValue;

/// Installs logging from `settings` and builds the configured engine.
///
/// An already-installed tracing subscriber is kept.
///
/// ```
/// use textfmt::prelude::*;
///
/// let engine = textfmt::setup(&FormatSettings::default()).unwrap();
/// assert_eq!(engine.format("%s!", &["hi".into()]).unwrap(), "hi!");
/// ```
pub fn setup(settings: &FormatSettings) -> FormatResult<Engine> {
    let installed = textfmt_core::logging::setup_logging(settings);
    tracing::debug!(installed, formatters = ?settings.formatters, "textfmt configured");
    Engine::from_settings(settings)
}

/// Formats any displayable value as a template.
///
/// The value's `Display` output is the template, so custom types can carry
/// their own templates.
///
/// ```
/// use std::fmt;
/// use textfmt::prelude::*;
///
/// struct Banner;
///
/// impl fmt::Display for Banner {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("** %s **")
///     }
/// }
///
/// let engine = Engine::with_defaults();
/// assert_eq!(Banner.format_with(&engine, &["news".into()]).unwrap(), "** news **");
/// ```
pub trait Formattable {
    /// Formats `self.to_string()` with `engine`.
    fn format_with(&self, engine: &Engine, args: &[FormatValue]) -> FormatResult<String>;
}

impl<T: Display + ?Sized> Formattable for T {
    fn format_with(&self, engine: &Engine, args: &[FormatValue]) -> FormatResult<String> {
        engine.format(&self.to_string(), args)
    }
}

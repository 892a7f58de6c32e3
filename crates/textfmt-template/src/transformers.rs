//! Placeholder transformers.
//!
//! A transformer post-processes a resolved Python-style placeholder value
//! before it is stringified, e.g. `{0|json}`. Transformers are registered on a
//! [`PyStyleFormatter`](crate::pystyle::PyStyleFormatter) under a key.

use textfmt_core::error::{FormatError, FormatResult};

use crate::value::FormatValue;

/// The registry key of the built-in [`JsonTransformer`].
pub const JSON_TRANSFORMER: &str = "json";

/// A named post-processing step for placeholder values.
///
/// Any `Fn(&FormatValue) -> FormatResult<FormatValue>` closure is a transformer.
pub trait Transformer: Send + Sync {
    /// Transforms a resolved value.
    fn apply(&self, value: &FormatValue) -> FormatResult<FormatValue>;
}

impl<F> Transformer for F
where
    F: Fn(&FormatValue) -> FormatResult<FormatValue> + Send + Sync,
{
    fn apply(&self, value: &FormatValue) -> FormatResult<FormatValue> {
        self(value)
    }
}

/// Structural JSON stringification.
///
/// `Undefined` and callables have no JSON form and stay `Undefined`; every
/// other value becomes its compact JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransformer;

impl Transformer for JsonTransformer {
    fn apply(&self, value: &FormatValue) -> FormatResult<FormatValue> {
        if matches!(value, FormatValue::Undefined | FormatValue::Callable(_)) {
            return Ok(FormatValue::Undefined);
        }
        serde_json::to_string(&value.to_json())
            .map(FormatValue::String)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }
}

//! Core error types for textfmt.
//!
//! [`FormatError`] covers every failure the engine can surface: registry
//! mistakes (duplicate or missing names, unsupported capabilities), argument
//! problems found while substituting a directive or placeholder, and the
//! configuration errors raised while loading settings.

use thiserror::Error;

/// The primary error type for textfmt.
///
/// All failures are raised synchronously at the point of detection and abort
/// the surrounding `format` call; no partially substituted string is returned.
#[derive(Error, Debug)]
pub enum FormatError {
    // ── Registries ───────────────────────────────────────────────────

    /// A formatter, directive parser or transformer with this name is
    /// already registered.
    #[error("{kind} '{name}' already exists")]
    DuplicateName {
        /// What kind of entry was being registered (e.g. "Formatter").
        kind: &'static str,
        /// The conflicting name.
        name: String,
    },

    /// No formatter, directive parser or transformer with this name exists.
    #[error("{kind} '{name}' does not exist")]
    NotFound {
        /// What kind of entry was being looked up.
        kind: &'static str,
        /// The missing name.
        name: String,
    },

    /// The formatter does not support the requested registry operation.
    #[error("{formatter} does not support {operation}")]
    UnsupportedOperation {
        /// Name of the formatter that rejected the call.
        formatter: String,
        /// Short description of the rejected capability.
        operation: &'static str,
    },

    // ── Substitution ─────────────────────────────────────────────────

    /// The argument has the wrong type for the directive consuming it.
    #[error("{value} is not {expected}")]
    TypeMismatch {
        /// The expected kind, with article (e.g. "an integer").
        expected: &'static str,
        /// The display form of the offending argument.
        value: String,
    },

    /// The requested field cannot hold the content it must contain.
    #[error("Range error: {0}")]
    RangeError(String),

    /// A template mixed implicit (`{}`) and explicit (`{0}`) indexing.
    #[error("cannot switch from {from} to {to} format indexing")]
    IndexingModeConflict {
        /// The mode already established by earlier placeholders.
        from: &'static str,
        /// The mode the offending placeholder would switch to.
        to: &'static str,
    },

    /// A placeholder referenced a transformer that is not registered.
    #[error("no transformer named \"{0}\"")]
    UnknownTransformer(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// A value could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormatError {
    /// Shorthand for [`FormatError::DuplicateName`].
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`FormatError::NotFound`].
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`FormatError::UnsupportedOperation`].
    pub fn unsupported(formatter: impl Into<String>, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            formatter: formatter.into(),
            operation,
        }
    }

    /// Shorthand for [`FormatError::TypeMismatch`].
    pub fn type_mismatch(expected: &'static str, value: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            value: value.into(),
        }
    }

    /// Returns a stable, machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "duplicate_name",
            Self::NotFound { .. } => "not_found",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::RangeError(_) => "range_error",
            Self::IndexingModeConflict { .. } => "indexing_mode_conflict",
            Self::UnknownTransformer(_) => "unknown_transformer",
            Self::ConfigurationError(_) => "configuration_error",
            Self::SerializationError(_) => "serialization_error",
            Self::IoError(_) => "io_error",
        }
    }
}

/// A convenience type alias for `Result<T, FormatError>`.
pub type FormatResult<T> = Result<T, FormatError>;

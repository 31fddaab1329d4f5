//! Error types for value parsing in depin-types.

use thiserror::Error;

/// Errors that can occur when parsing console values from text.
///
/// Backend payloads, CLI arguments and imported settings all carry enums as
/// plain strings; this is what comes back when one of them is not recognised.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string is not a known value for the named kind.
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue {
        /// What was being parsed (e.g. "severity").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A timestamp could not be parsed.
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

impl ParseError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Result type alias using depin-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

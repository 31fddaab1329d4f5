//! Error types for depin-core.
//!
//! Every fallible operation in the sync engine, the data sources and the
//! persisted stores returns [`Error`].
//!
//! # Recovery
//!
//! | Error Type | Strategy |
//! |------------|----------|
//! | [`Error::NotReachable`] | Keep polling, the next tick retries |
//! | [`Error::ApiStatus`] | Keep polling, report the message |
//! | [`Error::Unavailable`] | Keep polling (injected or transient source failure) |
//! | [`Error::InvalidUrl`] / [`Error::InvalidConfig`] | Fix configuration and restart |
//! | [`Error::InvalidImport`] / [`Error::Validation`] | Report to user, state unchanged |
//! | [`Error::Storage`] / [`Error::Json`] | Report to user, fall back to defaults |
//!
//! The poller never stops on a fetch error: a failed tick leaves the view
//! untouched and the subscription keeps its schedule.

use thiserror::Error;

use depin_types::ParseError;

/// Errors produced by the sync engine and its data sources.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The backend could not be reached.
    #[cfg(feature = "api-client")]
    #[error("Backend not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request or body decoding failed.
    #[cfg(feature = "api-client")]
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    ApiStatus { status: u16, message: String },

    /// Malformed base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A settings import was rejected; nothing was changed.
    #[error("Invalid settings file: {0}")]
    InvalidImport(String),

    /// A form submission failed validation.
    #[error("{0}")]
    Validation(String),

    /// The data source is temporarily unable to answer.
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing persisted state failed.
    #[error(transparent)]
    Storage(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A backend value could not be interpreted.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// Whether the failure is expected to clear on its own (network, backend).
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "api-client")]
            Error::NotReachable { .. } | Error::Request(_) => true,
            Error::ApiStatus { status, .. } => *status >= 500,
            Error::Unavailable(_) => true,
            _ => false,
        }
    }
}

/// Result type alias using depin-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ApiStatus {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "API error (503): Service Unavailable");

        let err = Error::Validation("Passwords do not match".into());
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::Unavailable("x".into()).is_transient());
        assert!(
            Error::ApiStatus {
                status: 502,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !Error::ApiStatus {
                status: 404,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!Error::InvalidImport("bad".into()).is_transient());
    }

    #[test]
    fn test_parse_error_converts() {
        let parse: Result<depin_types::Severity> =
            "urgent".parse::<depin_types::Severity>().map_err(Error::from);
        assert!(matches!(parse, Err(Error::Parse(_))));
    }
}

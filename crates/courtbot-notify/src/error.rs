//! Error type shared by configuration, SMS delivery, and alert reporting.

/// Everything that can go wrong outside the pure message formatters.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A required environment variable is unset or empty.
    #[error("{0} is not set")]
    MissingEnv(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("{var} has an invalid value: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    /// The HTTP request could not be built, sent, or read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("{service} API HTTP {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// A message kind was rendered without the record it interpolates.
    #[error("{kind} needs {field}")]
    MissingInput {
        kind: &'static str,
        field: &'static str,
    },

    /// Alert forwarding was started outside a Tokio runtime.
    #[error("alert forwarding needs a Tokio runtime")]
    NoRuntime,
}

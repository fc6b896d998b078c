use serde::Serialize;
use thiserror::Error;

/// The main error type for pve_janitor operations.
///
/// Only the variants raised while setting up a run (connection, authentication,
/// validation, local I/O) are fatal. Per-request failures are carried as
/// [`ApiError`] values and recovered by the caller.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// Represents errors that occur while preparing the HTTP transport
    ///
    /// # Fields
    /// * `0` - A description of what went wrong
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents a failed authentication exchange
    ///
    /// # Fields
    /// * `status` - HTTP status returned by the server, absent on transport failure
    /// * `body` - Response body or transport error text
    #[error("Authentication error{}: {body}", status_suffix(.status))]
    Authentication { status: Option<u16>, body: String },

    /// Represents validation failures of configuration or request values
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A single API request failed where the caller could not degrade it
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local file I/O failure (reports, plans)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure of a local document
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Failure of a single API request.
///
/// Transport-level failures (connection refused, TLS, timeouts) share this type
/// with HTTP status failures so callers apply one recovery policy to both.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The response body could not be decoded
    #[error("Failed to parse response: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// HTTP status of the failure, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(error: &reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            format!("request timed out: {error}")
        } else {
            error.to_string()
        };
        ApiError::Transport { message }
    }
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;

/// Type alias for the outcome of a single API request
pub type ApiResult<T> = Result<T, ApiError>;

//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server rejected the credentials (HTTP 401).
    #[error("Authentication failed: {message}")]
    Auth {
        /// Detail message from server.
        message: String,
    },

    /// Authenticated, but not allowed (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload failed server-side validation (HTTP 422).
    #[error("Validation failed: {message}")]
    Validation {
        /// Summary message from server.
        message: String,
        /// Per-field errors.
        errors: Vec<FieldError>,
    },

    /// Server returned any other error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Detail message from server.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store could not be read or written.
    #[error("Session store error: {0}")]
    Session(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth { .. }) || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { .. } => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Validation { .. } => Some(422),
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Map a failed response status and its decoded body to an error.
    pub(crate) fn from_status(status: u16, body: Option<ErrorResponse>) -> Self {
        let (message, errors) = match body {
            Some(body) => (body.detail, body.errors),
            None => (format!("HTTP {}", status), Vec::new()),
        };

        match status {
            401 => Error::Auth { message },
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            422 => Error::Validation { message, errors },
            _ => Error::Api { status, message },
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Error response from the server.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub detail: String,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

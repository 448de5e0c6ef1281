use thiserror::Error;

use crate::http::status::StatusCode;

/// An error that knows which status code and message the client should see.
///
/// Handlers return it (boxed, through `?`) to answer with something other than a 500.
/// See [`crate::http::response::error_response`] for how it is rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("http error {status}: {message}")]
pub struct StatusError {
    /// The status code to answer with.
    pub status: StatusCode,
    /// The message sent as the plain-text body.
    pub message: String,
}

impl StatusError {
    /// Creates a new error from a status code and a client-facing message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with the given message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 naming the resource that could not be found.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("Resource '{resource}' not found"),
        )
    }

    /// 500 with the given message.
    #[must_use]
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

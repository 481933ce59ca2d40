//! Error taxonomy for the Photoview client.

use thiserror::Error;

/// Errors raised by [PhotoviewClient](super::PhotoviewClient).
#[derive(Error, Debug)]
pub enum PhotoviewError {
    /// Bad credentials, HTTP 401/403, or an "unauthorized" GraphQL error.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Timeout, transport failure, or a non-2xx status unrelated to auth.
    #[error("communication error: {0}")]
    Communication(String),

    /// Well-formed response carrying GraphQL errors.
    #[error("GraphQL errors: {0}")]
    Protocol(String),

    /// The server answered but the requested item has nothing to return.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected client error: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, PhotoviewError>;

impl PhotoviewError {
    pub fn is_auth(&self) -> bool {
        matches!(self, PhotoviewError::Authentication(_))
    }
}

impl From<reqwest::Error> for PhotoviewError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PhotoviewError::Communication(format!("timeout talking to Photoview: {err}"))
        } else if err.is_connect() || err.is_request() || err.is_body() {
            PhotoviewError::Communication(format!("error talking to Photoview: {err}"))
        } else {
            PhotoviewError::Client(err.to_string())
        }
    }
}

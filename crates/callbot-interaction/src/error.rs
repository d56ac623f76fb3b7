//! Errors raised by the network collaborators.

use callbot_core::CallbotError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InteractionError {
    /// The request never produced an HTTP response.
    #[error("request failed: {message}")]
    Request { message: String, is_retryable: bool },

    /// The peer answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The response carried no usable content.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// The response body did not have the expected structure.
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl InteractionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { is_retryable, .. } | Self::Http { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Converts into the workspace error, tagged with the collaborator name.
    pub fn into_callbot(self, collaborator: &'static str) -> CallbotError {
        match self {
            Self::Decode(message) => CallbotError::decode(format!("{collaborator}: {message}")),
            other => CallbotError::collaborator(collaborator, other.to_string()),
        }
    }
}

impl From<reqwest::Error> for InteractionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request {
            is_retryable: err.is_connect() || err.is_timeout(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InteractionError>;

//! Error types for the todo session client.
//!
//! # Design
//! `Unauthorized` and `NotFound` get dedicated variants: the first drives the
//! session-clearing interceptor, the second is what callers most often
//! branch on. Every other non-2xx response lands in `Http` with the gateway's
//! `error` message when it sent one. `TodoNotFound` is the only error raised
//! locally, before any request is made.

use thiserror::Error;

use crate::types::TodoId;

/// Errors returned by the request builder, the transport and the actions.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401. Unless the login route was showing, the
    /// session has already been cleared by the time the caller sees this.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 401 and 404.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// `update_todo` was asked to change a todo that is not in the local list.
    #[error("todo {0} not found")]
    TodoNotFound(TodoId),
}

impl ApiError {
    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_reported_for_response_errors() {
        let unauthorized = ApiError::Unauthorized {
            message: "expired".to_string(),
        };
        assert_eq!(unauthorized.status(), Some(401));
        assert!(unauthorized.is_unauthorized());
        assert_eq!(ApiError::NotFound.status(), Some(404));
        assert_eq!(ApiError::Transport("refused".to_string()).status(), None);
        assert_eq!(ApiError::TodoNotFound(TodoId::from(9u64)).status(), None);
    }

    #[test]
    fn messages_name_the_failure() {
        let err = ApiError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert_eq!(
            ApiError::TodoNotFound(TodoId::from(99u64)).to_string(),
            "todo 99 not found"
        );
    }
}

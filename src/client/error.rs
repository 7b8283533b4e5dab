//! Client error types
//!
//! Every failure a fetcher or submitter can hit collapses into one of three
//! user-facing categories: missing credential, HTTP error, or transport/parse
//! error.

use thiserror::Error;

use crate::session::SessionError;

/// Message shown whenever an operation is attempted without a session token
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// Errors that can occur while talking to the hospital backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// No session token is stored; nothing was sent
    #[error("Authentication required")]
    AuthRequired,

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    /// Backend answered 2xx but the body reports the action did not happen
    #[error("Request rejected: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    /// Connection, timeout or other transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the JSON we expected
    #[error("Decode error: {0}")]
    Decode(String),

    /// Base URL or endpoint path could not be joined
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Token storage could not be read
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Reduce the error to the text a user should see.
    ///
    /// A missing token always reads "Authentication required"; an HTTP error
    /// carrying a server message shows that message; everything else falls
    /// back to `default`.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            ClientError::AuthRequired => AUTH_REQUIRED_MESSAGE.to_string(),
            ClientError::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Rejected {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            _ => default.to_string(),
        }
    }

    /// True when the request never left the client for lack of a token
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ClientError::AuthRequired)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

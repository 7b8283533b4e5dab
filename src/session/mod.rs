//! Session Holder
//!
//! Keeps the bearer token that every authenticated request carries.
//!
//! ## Storage format
//!
//! The token is persisted JSON-encoded (`"eyJhbGci..."`), the same shape the
//! web front-end keeps under its `jwt` storage key. Reads accept either a JSON
//! string or a bare token; blank content and `null` count as "no session".
//!
//! There is no expiry check and no refresh: a token stays valid until it is
//! cleared or replaced.

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Persistent holder for the session token
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when no session exists
    async fn get_token(&self) -> Result<Option<String>, SessionError>;

    /// Replace the stored token
    async fn set_token(&self, token: &str) -> Result<(), SessionError>;

    /// Forget the stored token
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Errors from token storage
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access token file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Token must not be empty")]
    EmptyToken,
}

/// Decode the stored representation into a token.
pub(crate) fn decode_stored(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let token = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Null) => return None,
        // Anything else that happens to parse (a bare number, say) is kept verbatim
        Ok(_) | Err(_) => trimmed.to_string(),
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Encode a token for storage.
pub(crate) fn encode_stored(token: &str) -> Result<String, SessionError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SessionError::EmptyToken);
    }
    // Serializing a &str cannot fail
    Ok(serde_json::Value::String(token.to_string()).to_string())
}

//! File-backed token store

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{decode_stored, encode_stored, SessionError, TokenStore};

/// Token store that persists the session in a single file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data dir>/medidesk/jwt`
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join("medidesk").join("jwt"))
            .unwrap_or_else(|| PathBuf::from("./.medidesk_jwt"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, error: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            error: error.to_string(),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get_token(&self) -> Result<Option<String>, SessionError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(decode_stored(&raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let encoded = encode_stored(token)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(path = ?self.path, "Session token stored");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "Session token cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

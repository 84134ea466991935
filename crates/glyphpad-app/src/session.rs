//! Auth session storage.
//!
//! The drawing screen only reads the bearer token and clears it when the
//! server reports the session as expired.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// Session storage errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Session error: {0}")]
    Other(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Trait for token storage backends.
pub trait SessionStore: Send + Sync {
    /// The stored bearer token, if any. Empty tokens count as none.
    fn token(&self) -> Option<String>;

    /// Store a token.
    fn set_token(&self, token: &str) -> SessionResult<()>;

    /// Forget the token (logs the user out).
    fn clear_token(&self) -> SessionResult<()>;
}

/// In-memory session for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that is already logged in.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySession {
    fn token(&self) -> Option<String> {
        let token = self.token.read().ok()?;
        token.clone().filter(|t| !t.is_empty())
    }

    fn set_token(&self, token: &str) -> SessionResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> SessionResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| SessionError::Other(format!("Lock error: {}", e)))?;
        *slot = None;
        Ok(())
    }
}

/// Token stored in a single file on disk.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    /// Use `path` as the token file. Parent directories are created on write.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Token file in the default location.
    ///
    /// On Unix: `~/.local/share/glyphpad/token`
    /// On Windows: `%LOCALAPPDATA%\glyphpad\token`
    pub fn default_location() -> SessionResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SessionError::Io("Could not determine home directory".to_string()))?;

        Ok(Self::new(base.join("glyphpad").join("token")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSession {
    fn token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read token from {}: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SessionError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&self.path, token)
            .map_err(|e| SessionError::Io(format!("Failed to write {}: {}", self.path.display(), e)))
    }

    fn clear_token(&self) -> SessionResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(format!(
                "Failed to delete {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

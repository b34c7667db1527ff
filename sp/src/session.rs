//! User session persistence
//!
//! One [`User`] record is kept under a fixed key. The orchestrator reads it
//! once at construction, writes it at login and removes it at logout.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Key the user record is stored under
pub const SESSION_KEY: &str = "athea_user";

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Name is required to register")]
    MissingName,

    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl User {
    /// Build the user produced by the login form
    ///
    /// Registering keeps the given name. Signing in names the user after the
    /// local part of the email.
    pub fn from_login(email: &str, password: &str, name: Option<&str>, registering: bool) -> Result<Self, SessionError> {
        debug!(%email, %registering, "User::from_login: called");
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let name = if registering {
            match name.filter(|n| !n.is_empty()) {
                Some(n) => n.to_string(),
                None => return Err(SessionError::MissingName),
            }
        } else {
            email.split('@').next().unwrap_or_default().to_string()
        };

        Ok(Self {
            email: email.to_string(),
            name,
        })
    }
}

/// Storage for the single user record
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<User>, SessionError>;
    fn save(&self, user: &User) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the record as `{dir}/athea_user.json`
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(format!("{}.json", SESSION_KEY));
        debug!(?path, "FileSessionStore::new: called");
        Self { path }
    }

    /// Default location under the user's data directory
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("athea")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<User>, SessionError> {
        debug!(path = ?self.path, "FileSessionStore::load: called");
        if !self.path.exists() {
            debug!("FileSessionStore::load: no stored session");
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, user: &User) -> Result<(), SessionError> {
        debug!(path = ?self.path, email = %user.email, "FileSessionStore::save: called");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(user)?)?;
        info!("Saved session for {}", user.email);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        debug!(path = ?self.path, "FileSessionStore::clear: called");
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<User>, SessionError> {
        Ok(self.user.lock().ok().and_then(|u| u.clone()))
    }

    fn save(&self, user: &User) -> Result<(), SessionError> {
        if let Ok(mut slot) = self.user.lock() {
            *slot = Some(user.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        if let Ok(mut slot) = self.user.lock() {
            *slot = None;
        }
        Ok(())
    }
}

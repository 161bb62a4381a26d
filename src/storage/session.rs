use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::api::types::User;
use crate::config::Config;

/// Persisted auth state: the bearer token plus the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Session storage manager.
///
/// The file is read once; afterwards the transport consults the in-memory
/// snapshot on every outbound request, so no request does file I/O.
pub struct SessionStore {
    session_path: PathBuf,
    current: RwLock<Option<AuthSession>>,
}

impl SessionStore {
    pub fn open() -> Result<Self> {
        let dir = Config::ensure_config_dir()?;
        Self::at(dir.join("session.json"))
    }

    pub fn at(session_path: PathBuf) -> Result<Self> {
        let current = if session_path.exists() {
            let content = std::fs::read_to_string(&session_path)
                .context("Failed to read session file")?;
            Some(serde_json::from_str(&content).context("Failed to parse session file")?)
        } else {
            None
        };

        Ok(Self {
            session_path,
            current: RwLock::new(current),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.user.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.read().unwrap().is_some()
    }

    /// Persist a new session (login/signup).
    pub fn save(&self, session: AuthSession) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&session).context("Failed to serialize session")?;
        std::fs::write(&self.session_path, content).context("Failed to write session file")?;
        *self.current.write().unwrap() = Some(session);
        Ok(())
    }

    /// Drop the session (logout).
    pub fn clear(&self) -> Result<()> {
        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path).context("Failed to delete session file")?;
        }
        *self.current.write().unwrap() = None;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.session_path
    }
}

// Local persistence of the auth session between runs, the same way the hosted
// client library keeps it in browser storage between page loads.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Session;

/// File-backed store for the current session (`~/.fitlog/session.toml`)
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session, if any
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).context("Failed to read session file")?;
        let session: Session = toml::from_str(&contents).context("Failed to parse session file")?;

        tracing::debug!("Loaded persisted session from {:?}", self.path);
        Ok(Some(session))
    }

    /// Persist the session, replacing any previous one
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create session directory")?;
        }

        let contents = toml::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(&self.path, contents).context("Failed to write session file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .context("Failed to restrict session file permissions")?;
        }

        tracing::debug!("Saved session to {:?}", self.path);
        Ok(())
    }

    /// Remove the persisted session. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path).context("Failed to remove session file")?;
        tracing::debug!("Removed session file {:?}", self.path);
        Ok(true)
    }
}

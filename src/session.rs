use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::auth::{decode_claims, display_name};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no data directory available for the session file")]
    NoDataDir,
    #[error("session file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("corrupt session file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("could not serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The logged-in user. Loaded once at startup and passed to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    /// Build a session from a freshly issued access token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, ApiError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self { token, user_id: claims.user_id, email: claims.email })
    }

    pub fn display_name(&self) -> String {
        display_name(self.email.as_deref())
    }

    pub fn default_path() -> Result<PathBuf, SessionError> {
        let proj = ProjectDirs::from("dev", "taskevo", "taskevo").ok_or(SessionError::NoDataDir)?;
        Ok(proj.data_dir().join("session.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, SessionError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SessionError::Io { path: path.to_path_buf(), source }),
        };
        toml::from_str(&text)
            .map(Some)
            .map_err(|source| SessionError::Parse { path: path.to_path_buf(), source })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        info!("session saved for user {}", self.user_id);
        Ok(())
    }

    /// Remove the saved session. Returns whether one existed.
    pub fn clear_at(path: &Path) -> Result<bool, SessionError> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("session cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SessionError::Io { path: path.to_path_buf(), source }),
        }
    }
}

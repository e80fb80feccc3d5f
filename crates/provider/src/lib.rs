//! Credentials and process settings for the image generation tools.
//!
//! Settings come from the environment. The server binary may load a `.env` file first; this
//! module only reads variables through a lookup function so tests never touch the real process
//! environment.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_KEY_VAR: &str = "LAOZHANG_API_KEY";
pub const VAULT_PATH_VAR: &str = "OBSIDIAN_VAULT_PATH";
pub const GRAPHICS_FOLDER_VAR: &str = "AI_GRAPHICS_FOLDER";

pub const DEFAULT_VAULT_PATH: &str = "~/Obsidian/VAULTS/Trinity";
pub const DEFAULT_GRAPHICS_FOLDER: &str = "110 Assets/AI graphics";

/// Credentials provided by the application layer.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// API key string; sent as a bearer token.
    ApiKey(String),
    /// Bearer token, with or without the "Bearer " prefix.
    Bearer(String),
    None,
}

impl Credentials {
    /// Value for the `Authorization` header, if any credential is present.
    pub fn as_bearer(&self) -> Option<String> {
        match self {
            Credentials::ApiKey(s) if s.is_empty() => None,
            Credentials::ApiKey(s) => Some(format!("Bearer {}", s)),
            Credentials::Bearer(s) => Some(if s.to_lowercase().starts_with("bearer ") {
                s.clone()
            } else {
                format!("Bearer {}", s)
            }),
            Credentials::None => None,
        }
    }
}

// Keys must never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credentials::None => f.write_str("None"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{var} environment variable is required")]
    MissingApiKey { var: &'static str },
    #[error("cannot expand '~': home directory is unknown")]
    NoHomeDirectory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub vault_path: PathBuf,
    /// Folder inside the vault where images are written.
    pub graphics_folder: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(SettingsError::MissingApiKey { var: API_KEY_VAR })?;

        let vault_raw = lookup(VAULT_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VAULT_PATH.to_string());
        let graphics_folder = lookup(GRAPHICS_FOLDER_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GRAPHICS_FOLDER.to_string());

        Ok(Self {
            credentials: Credentials::ApiKey(api_key),
            vault_path: expand_home(&vault_raw)?,
            graphics_folder,
        })
    }

    /// Directory generated images are saved to and listed from.
    pub fn output_dir(&self) -> PathBuf {
        self.vault_path.join(&self.graphics_folder)
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(raw: &str) -> Result<PathBuf, SettingsError> {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };
    match rest {
        Some(rest) => {
            let dirs = directories::BaseDirs::new().ok_or(SettingsError::NoHomeDirectory)?;
            Ok(join_home(dirs.home_dir(), rest))
        }
        None => Ok(PathBuf::from(raw)),
    }
}

fn join_home(home: &Path, rest: &str) -> PathBuf {
    if rest.is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    }
}

#[cfg(test)]
#[path = "../tests/settings_tests.rs"]
mod settings_tests;

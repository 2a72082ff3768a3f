//! Reading and writing `~/.linemap/config.ini`.
//!
//! A missing file is not an error: every key falls back to its default.
//! A file that exists but does not parse is reported and left untouched.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::parser::parse_ini;
use super::settings::ConfigFile;
use super::writer::to_config_string;

/// Name of the per-user configuration directory under `$HOME`.
const CONFIG_DIR_NAME: &str = ".linemap";

/// Name of the configuration file inside [`config_directory`].
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not valid INI
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// A key parsed but its value is out of range or malformed
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load `~/.linemap/config.ini`, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        parse_ini(&Ini::load_from_file(path)?)
    }

    /// Write to `~/.linemap/config.ini`.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Write to `path`, creating its directory first.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(ConfigFileError::DirectoryError)?;
        }
        fs::write(path, to_config_string(self))
            .map_err(|e| ConfigFileError::WriteError(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }
}

/// `~/.linemap`, or `./.linemap` when there is no home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.linemap/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

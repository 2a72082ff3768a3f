//! Shared setup for commands that read configuration and write logs.

use std::path::PathBuf;

use crate::error::CliError;
use linemap::config::{ConfigFile, MapConfig, DEFAULT_LOG_FILE_NAME};
use linemap::logging::{init_logging, LoggingGuard};
use tracing::info;

/// Loaded configuration plus the log writer that lives as long as the
/// command.
pub struct CliRunner {
    _logging: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load `~/.linemap/config.ini` and start logging to `logging.file`.
    ///
    /// Logs never go to stdout, which belongs to command output. `debug`
    /// overrides `RUST_LOG`.
    pub fn with_debug(debug: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (dir, file) = split_log_path(&config.logging.file);
        let logging = init_logging(&dir, &file, false, debug)
            .map_err(|e| CliError::LoggingInit(format!("{}: {}", config.logging.file.display(), e)))?;

        Ok(Self {
            _logging: logging,
            config,
        })
    }

    /// Map view settings from the loaded file.
    pub fn map_config(&self) -> MapConfig {
        MapConfig::from(&self.config)
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = linemap::VERSION,
            command,
            basemap = %self.config.map.basemap,
            "LineMap CLI started"
        );
    }
}

/// Directory and file name of a configured log path.
fn split_log_path(path: &std::path::Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string());
    (dir, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_split_log_path() {
        let (dir, file) = split_log_path(Path::new("/var/log/linemap/run.log"));
        assert_eq!(dir, PathBuf::from("/var/log/linemap"));
        assert_eq!(file, "run.log");
    }

    #[test]
    fn test_split_bare_file_name() {
        let (dir, file) = split_log_path(Path::new("run.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "run.log");
    }
}

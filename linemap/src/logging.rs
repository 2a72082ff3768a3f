//! Tracing setup for hosts embedding the map engine.
//!
//! Events go to a log file that is truncated at start, by default
//! `~/.linemap/linemap.log`. `RUST_LOG` picks the level unless debug is
//! forced, and stdout mirroring is opt-in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive; dropping it flushes the file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file,
/// and installs a global subscriber writing to the file and, when `stdout`
/// is set, to the terminal.
///
/// # Arguments
///
/// * `log_dir` - Directory for log files (e.g., "~/.linemap")
/// * `log_file` - Log filename (e.g., "linemap.log")
/// * `stdout` - Also print to stdout
/// * `debug` - Force debug level regardless of RUST_LOG
///
/// # Errors
///
/// Fails when the directory cannot be created or the file cannot be
/// truncated.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    stdout: bool,
    debug: bool,
) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(true)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Create `log_dir` and truncate `log_file` inside it.
pub fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;
    Ok(log_path)
}

/// Filter from RUST_LOG (default `info`), or `debug` when forced.
fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Get default log directory path (~/.linemap).
pub fn default_log_dir() -> PathBuf {
    crate::config::config_directory()
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    crate::config::DEFAULT_LOG_FILE_NAME
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert!(default_log_dir().ends_with(".linemap"));
        assert_eq!(default_log_file(), "linemap.log");
    }

    #[test]
    fn test_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let log_dir = temp.path().join("logs");

        let path = prepare_log_file(&log_dir, "test.log").unwrap();

        assert!(log_dir.exists(), "Log directory should be created");
        assert_eq!(path, log_dir.join("test.log"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_truncates_previous_session() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("test.log");
        fs::write(&log_path, "old log data").unwrap();

        prepare_log_file(temp.path(), "test.log").unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "", "File should be cleared");
    }

    #[test]
    fn test_creates_nested_log_directory() {
        let temp = TempDir::new().unwrap();
        let log_dir = temp.path().join("deep").join("nested");

        let path = prepare_log_file(&log_dir, "test.log").unwrap();
        assert!(path.exists(), "Log file should exist in nested directory");
    }

    #[test]
    fn test_directory_blocked_by_file() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        // Should return error, not panic
        assert!(prepare_log_file(&blocker.join("logs"), "test.log").is_err());
    }

    #[test]
    fn test_debug_forces_debug_filter() {
        assert_eq!(env_filter(true).to_string(), "debug");
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard { _file_guard: guard };
    }

    // Actual log output needs a global subscriber, which can only be set
    // once per process, so it is not exercised here.
}

//! Errors reported by the `linemap` binary.
//!
//! Every failure ends in [`CliError::exit`], which prints the message and
//! a hint to stderr and exits with status 1.

use std::fmt;
use std::process;
use linemap::config::ConfigFileError;
use linemap::feature::FeatureError;

/// A command failure, worded for the terminal.
#[derive(Debug)]
pub enum CliError {
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Configuration file could not be read or written
    ConfigFile(ConfigFileError),
    /// Failed to read an input file
    FileRead { path: String, error: std::io::Error },
    /// Input file is not usable GeoJSON
    Feature { path: String, error: FeatureError },
    /// Input file parsed but lacks what the command needs
    InvalidInput { path: String, reason: String },
    /// Malformed command argument
    InvalidArgument(String),
}

impl CliError {
    /// Print the error and a hint for fixing it, then exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Hints
        match self {
            CliError::Config(_) | CliError::ConfigFile(_) => {
                eprintln!();
                eprintln!("Use 'linemap config list' to see available keys and current values.");
                eprintln!("Use 'linemap config path' to locate the configuration file.");
            }
            CliError::Feature { .. } | CliError::InvalidInput { .. } => {
                eprintln!();
                eprintln!("Input files must be GeoJSON FeatureCollections with [lon, lat] coordinates.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration error: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read file '{}': {}", path, error)
            }
            CliError::Feature { path, error } => write!(f, "Failed to load '{}': {}", path, error),
            CliError::InvalidInput { path, reason } => {
                write!(f, "Invalid input '{}': {}", path, reason)
            }
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::Feature { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

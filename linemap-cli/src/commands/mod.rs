//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`analyze`] - Corridor crossings and risk ranking
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`distance`] - Great-circle distance between two positions
//! - [`preview`] - Headless map view over an in-memory surface

pub mod analyze;
pub mod common;
pub mod config;
pub mod distance;
pub mod preview;

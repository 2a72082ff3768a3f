//! LineMap CLI - Command-line interface
//!
//! This binary provides a command-line interface to the LineMap library:
//! corridor analysis, distance measurement, a headless map preview, and
//! configuration management.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::analyze::AnalyzeArgs;
use commands::config::ConfigCommands;
use commands::distance::DistanceArgs;
use commands::preview::PreviewArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "linemap")]
#[command(version = linemap::VERSION)]
#[command(about = "Power line corridor map engine", long_about = None)]
struct Cli {
    /// Enable debug logging regardless of RUST_LOG
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find corridor crossings and rank records by risk
    Analyze(AnalyzeArgs),

    /// Great-circle distance between two lon,lat positions
    Distance(DistanceArgs),

    /// Drive a headless map view and print the resulting layers
    Preview(PreviewArgs),

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze(args) => {
            CliRunner::with_debug(cli.debug).and_then(|runner| commands::analyze::run(args, &runner))
        }
        Commands::Distance(args) => commands::distance::run(args),
        Commands::Preview(args) => {
            CliRunner::with_debug(cli.debug).and_then(|runner| commands::preview::run(args, &runner))
        }
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_distance_with_negative_coordinates() {
        let cli = Cli::try_parse_from(["linemap", "distance", "-46.6,-23.5", "-46.7,-23.6"]).unwrap();
        match cli.command {
            Commands::Distance(args) => {
                assert_eq!(args.from, "-46.6,-23.5");
                assert_eq!(args.to, "-46.7,-23.6");
            }
            _ => panic!("expected distance command"),
        }
    }

    #[test]
    fn test_parse_preview_filters() {
        let cli = Cli::try_parse_from([
            "linemap",
            "--debug",
            "preview",
            "records.geojson",
            "--severity",
            "high",
            "--severity",
            "medium",
            "--zoom",
            "10",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Preview(args) => {
                assert_eq!(args.severity.len(), 2);
                assert_eq!(args.zoom, Some(10.0));
            }
            _ => panic!("expected preview command"),
        }
    }
}

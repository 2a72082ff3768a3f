//! Great-circle distance between two positions.

use clap::Args;
use linemap::coord::haversine_km;
use linemap::measure::format_distance;

use super::common::parse_lng_lat;
use crate::error::CliError;

/// Arguments for the distance command.
#[derive(Debug, Args)]
pub struct DistanceArgs {
    /// First position as lon,lat (e.g., -46.63,-23.55)
    #[arg(allow_hyphen_values = true)]
    pub from: String,

    /// Second position as lon,lat
    #[arg(allow_hyphen_values = true)]
    pub to: String,

    /// Print kilometres as a bare number
    #[arg(long)]
    pub raw: bool,
}

/// Run the distance command.
pub fn run(args: DistanceArgs) -> Result<(), CliError> {
    let from = parse_lng_lat(&args.from)?;
    let to = parse_lng_lat(&args.to)?;
    let km = haversine_km(from, to);

    if args.raw {
        println!("{:.6}", km);
    } else {
        println!("{}", format_distance(km));
    }
    Ok(())
}

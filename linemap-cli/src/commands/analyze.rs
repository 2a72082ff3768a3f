//! Corridor analysis: crossings and risk ranking.

use std::path::PathBuf;

use clap::Args;
use linemap::coord::LngLat;
use linemap::feature::FeatureRecord;
use linemap::geometry::{
    collect_intersections, within_distance, CrossingPoint, CrossingSummary, ObstacleKind,
};
use linemap::risk::{attention_threshold, RiskAssessment};
use serde_json::json;
use tracing::info;

use super::common::{load_all_lines, load_corridor, load_records};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the analyze command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Records as a GeoJSON FeatureCollection
    pub records: PathBuf,

    /// Corridor line (first line feature of the file)
    #[arg(long)]
    pub corridor: PathBuf,

    /// Highway lines (repeatable)
    #[arg(long = "highways")]
    pub highways: Vec<PathBuf>,

    /// Railway lines (repeatable)
    #[arg(long = "railways")]
    pub railways: Vec<PathBuf>,

    /// Only list records within this many metres of the corridor
    #[arg(long)]
    pub buffer: Option<f64>,

    /// Number of ranked records to print
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Crossing proximity decay constant (overrides risk.proximity_k)
    #[arg(long)]
    pub proximity_k: Option<f64>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the analyze command.
pub fn run(args: AnalyzeArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("analyze");

    let records = load_records(&args.records)?;
    let corridor = load_corridor(&args.corridor)?;
    let highways = load_all_lines(&args.highways)?;
    let railways = load_all_lines(&args.railways)?;

    let mut crossings = collect_intersections(&corridor, &highways, ObstacleKind::Highway);
    crossings.extend(collect_intersections(&corridor, &railways, ObstacleKind::Railway));
    let summary = CrossingSummary::from_crossings(&crossings);

    let candidates = match args.buffer {
        Some(meters) => near_corridor(&records, &corridor, meters),
        None => records.iter().collect(),
    };

    let mut model = runner.map_config().risk_model();
    if let Some(k) = args.proximity_k {
        if k <= 0.0 {
            return Err(CliError::InvalidArgument(
                "--proximity-k must be positive".to_string(),
            ));
        }
        model = model.with_proximity_k(k);
    }
    let ranking = model.rank(candidates.iter().copied(), &crossings);
    let threshold = attention_threshold(&ranking);

    info!(
        records = records.len(),
        candidates = candidates.len(),
        highway = summary.highway,
        railway = summary.railway,
        "Corridor analysis complete"
    );

    if args.json {
        print_json(&crossings, &summary, &ranking, threshold, args.top);
    } else {
        print_report(&crossings, &summary, &ranking, threshold, args.top);
    }
    Ok(())
}

/// Records whose anchor lies within `meters` of the corridor.
fn near_corridor<'a>(
    records: &'a [FeatureRecord],
    corridor: &[LngLat],
    meters: f64,
) -> Vec<&'a FeatureRecord> {
    let anchored: Vec<(&FeatureRecord, LngLat)> = records
        .iter()
        .filter_map(|r| r.anchor().map(|a| (r, a)))
        .collect();
    let points: Vec<_> = anchored.iter().map(|(_, a)| *a).collect();
    within_distance(&points, &[corridor.to_vec()], meters)
        .into_iter()
        .filter_map(|i| anchored.get(i).map(|(r, _)| *r))
        .collect()
}

fn print_json(
    crossings: &[CrossingPoint],
    summary: &CrossingSummary,
    ranking: &[RiskAssessment],
    threshold: f64,
    top: usize,
) {
    let report = json!({
        "crossings": crossings,
        "summary": summary,
        "attention_span_m": threshold,
        "ranking": ranking.iter().take(top).collect::<Vec<_>>(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
    );
}

fn print_report(
    crossings: &[CrossingPoint],
    summary: &CrossingSummary,
    ranking: &[RiskAssessment],
    threshold: f64,
    top: usize,
) {
    println!("Corridor Crossings");
    println!("==================");
    println!("  Highway: {}", summary.highway);
    println!("  Railway: {}", summary.railway);
    for crossing in crossings {
        println!("  - {} at {}", crossing.tag, crossing.coordinate);
    }
    println!();

    println!("Risk Ranking");
    println!("============");
    if ranking.is_empty() {
        println!("  (no records)");
        return;
    }
    println!(
        "  {:>3}  {:<20} {:>8} {:>9} {:>9} {:>7}",
        "#", "ID", "SPAN(m)", "CORROSION", "PROXIMITY", "SCORE"
    );
    for (rank, a) in ranking.iter().take(top).enumerate() {
        let flag = if a.span_length >= threshold { "!" } else { "" };
        println!(
            "  {:>3}  {:<20} {:>8.1} {:>9.3} {:>9.3} {:>7.3} {}",
            rank + 1,
            a.record_id,
            a.span_length,
            a.corrosion_index,
            a.crossing_proximity_factor,
            a.composite_score,
            flag
        );
    }
    println!();
    println!("  ! span at or above the 90th percentile ({:.1} m)", threshold);
}

//! Headless map preview.
//!
//! Drives a [`MapView`] over an in-memory surface exactly as an interactive
//! host would (style load callback, records, filter, corridor, focus and
//! measurement clicks) and prints the resulting surface state.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use clap::Args;
use linemap::filter::RecordFilter;
use linemap::surface::{MemorySurface, RenderSurface};
use linemap::view::{MapView, ViewOutcome};
use serde_json::json;
use tracing::{debug, info};

use super::common::{
    load_all_lines, load_corridor, load_records, parse_lng_lat, SeverityArg,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Viewport of the headless surface in pixels.
const PREVIEW_VIEWPORT: (f64, f64) = (1280.0, 800.0);

/// Arguments for the preview command.
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Records as a GeoJSON FeatureCollection
    pub records: Option<PathBuf>,

    /// Corridor line (first line feature of the file)
    #[arg(long)]
    pub corridor: Option<PathBuf>,

    /// Highway lines (repeatable)
    #[arg(long = "highways")]
    pub highways: Vec<PathBuf>,

    /// Railway lines (repeatable)
    #[arg(long = "railways")]
    pub railways: Vec<PathBuf>,

    /// Base map id (overrides map.basemap)
    #[arg(long)]
    pub basemap: Option<String>,

    /// Zoom level to report after loading
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Keep only these severities (repeatable)
    #[arg(long, value_enum)]
    pub severity: Vec<SeverityArg>,

    /// Keep only records started within this many hours
    #[arg(long)]
    pub within_hours: Option<i64>,

    /// Keep only records whose id or name contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Focus a record by id
    #[arg(long)]
    pub focus: Option<String>,

    /// Measurement click as lon,lat (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    pub measure: Vec<String>,

    /// Turn terrain on (only shown on basemaps with elevation)
    #[arg(long)]
    pub terrain: bool,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the preview command.
pub fn run(args: PreviewArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("preview");

    let mut config = runner.map_config();
    if let Some(basemap) = &args.basemap {
        config = config.with_basemap(basemap.clone());
    }

    let surface = MemorySurface::new(PREVIEW_VIEWPORT, config.camera());
    let mut view = MapView::new(surface, "preview", &config);
    let loaded = view.surface_mut().complete_style_load();
    view.handle_event(&loaded);

    let now = Utc::now();
    if let Some(path) = &args.records {
        view.set_records(load_records(path)?, now);
    }
    view.set_filter(build_filter(&args)?, now);

    if let Some(path) = &args.corridor {
        let corridor = load_corridor(path)?;
        let highways = load_all_lines(&args.highways)?;
        let railways = load_all_lines(&args.railways)?;
        view.set_corridor(&corridor, &highways, &railways);
    }

    if let Some(zoom) = args.zoom {
        view.set_zoom(zoom);
    }
    if args.terrain {
        view.set_terrain(true);
    }
    if let Some(id) = &args.focus {
        if !view.focus(id) {
            println!("Record '{}' is not in the filtered set", id);
        }
    }
    if !args.measure.is_empty() {
        view.toggle_measurement();
        for text in &args.measure {
            let point = parse_lng_lat(text)?;
            let click = view.surface().click_map(point);
            if let ViewOutcome::Measured { distance_km } = view.handle_event(&click) {
                debug!(?distance_km, "Preview measurement click");
            }
        }
    }

    for event in view.surface_mut().take_events() {
        view.handle_event(&event);
    }

    info!(
        records = view.records().len(),
        filtered = view.filtered_records().count(),
        "Preview complete"
    );

    if args.json {
        print_json(&mut view);
    } else {
        print_report(&mut view);
    }
    view.teardown();
    Ok(())
}

fn build_filter(args: &PreviewArgs) -> Result<RecordFilter, CliError> {
    let mut filter = RecordFilter::new();
    for severity in &args.severity {
        filter = filter.with_severity((*severity).into());
    }
    if let Some(hours) = args.within_hours {
        filter = filter.within(window_from_hours(hours)?);
    }
    if let Some(text) = &args.search {
        filter = filter.with_search(text.clone());
    }
    Ok(filter)
}

/// `--within-hours` as a window, rejecting negative or unrepresentable values.
fn window_from_hours(hours: i64) -> Result<Duration, CliError> {
    if hours < 0 {
        return Err(CliError::InvalidArgument(format!(
            "--within-hours must not be negative, got {}",
            hours
        )));
    }
    Duration::try_hours(hours).ok_or_else(|| {
        CliError::InvalidArgument(format!("--within-hours {} is out of range", hours))
    })
}

fn print_report(view: &mut MapView<MemorySurface>) {
    let camera = view.surface().camera();

    println!("Map Preview");
    println!("===========");
    println!("  State:    {}", view.controller().state());
    println!("  Basemap:  {} ({})", view.basemap().name, view.basemap().id);
    println!("  Camera:   {} @ zoom {:.2}", camera.center, camera.zoom);
    println!("  Terrain:  {}", if view.terrain_enabled() { "on" } else { "off" });
    println!(
        "  Records:  {} ({} after filter)",
        view.records().len(),
        view.filtered_records().count()
    );
    println!();

    println!("Layers (bottom to top)");
    for id in view.controller().layer_order() {
        if let Some(layer) = view.surface().layer(&id) {
            println!(
                "  {:<24} {:<8} source={:<12} {}",
                layer.id,
                layer.kind,
                layer.source_id,
                if layer.visible { "visible" } else { "hidden" }
            );
        }
    }
    println!();

    println!("Sources");
    for id in view.surface().source_ids() {
        if let Some(source) = view.surface().source(&id) {
            println!("  {:<24} {} feature(s)", source.id, source.data.len());
        }
    }

    if let Some(id) = view.focused() {
        println!();
        println!("Focused: {}", id);
    }
    if let Some(label) = view.measurement().label() {
        println!();
        println!("Measured distance: {}", label);
    }
    for notice in view.take_notices() {
        println!();
        println!("Notice: {}", notice);
    }
}

fn print_json(view: &mut MapView<MemorySurface>) {
    let camera = view.surface().camera();
    let layers: Vec<_> = view
        .controller()
        .layer_order()
        .iter()
        .filter_map(|id| view.surface().layer(id))
        .map(|layer| {
            json!({
                "id": layer.id,
                "kind": layer.kind.as_str(),
                "source": layer.source_id,
                "visible": layer.visible,
            })
        })
        .collect();
    let sources: Vec<_> = view
        .surface()
        .source_ids()
        .iter()
        .filter_map(|id| view.surface().source(id))
        .map(|source| json!({ "id": source.id, "features": source.data.len() }))
        .collect();
    let notices: Vec<String> = view.take_notices().iter().map(|n| n.to_string()).collect();

    let report = json!({
        "state": view.controller().state().as_str(),
        "basemap": view.basemap().id,
        "camera": {
            "center": camera.center,
            "zoom": camera.zoom,
            "pitch": camera.pitch,
            "bearing": camera.bearing,
        },
        "terrain": view.terrain_enabled(),
        "records": view.records().len(),
        "filtered": view.filtered_records().count(),
        "layers": layers,
        "sources": sources,
        "focused": view.focused(),
        "measurement_km": view.measurement().distance_km(),
        "notices": notices,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_hours() {
        assert_eq!(window_from_hours(24).unwrap(), Duration::hours(24));
        assert_eq!(window_from_hours(0).unwrap(), Duration::zero());
    }

    #[test]
    fn test_window_from_hours_rejects_negative() {
        assert!(matches!(
            window_from_hours(-1),
            Err(CliError::InvalidArgument(msg)) if msg.contains("negative")
        ));
    }

    #[test]
    fn test_window_from_hours_rejects_overflow() {
        assert!(matches!(
            window_from_hours(i64::MAX),
            Err(CliError::InvalidArgument(msg)) if msg.contains("out of range")
        ));
    }
}

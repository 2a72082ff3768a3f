//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::file::config_directory;
use super::settings::*;
use crate::focus::{DEFAULT_EASE_DURATION_MS, DEFAULT_MIN_FOCUS_ZOOM};
use crate::layers::DEFAULT_HEATMAP_ZOOM_THRESHOLD;
use crate::risk::DEFAULT_PROXIMITY_K;
use crate::style::DEFAULT_BASEMAP;

// =============================================================================
// Map defaults
// =============================================================================

/// Default center longitude (Santos, SP).
pub const DEFAULT_CENTER_LON: f64 = -46.333;

/// Default center latitude (Santos, SP).
pub const DEFAULT_CENTER_LAT: f64 = -23.96;

/// Default initial zoom.
pub const DEFAULT_ZOOM: f64 = 12.0;

// =============================================================================
// Layer defaults
// =============================================================================

/// Default cluster radius in pixels.
pub const DEFAULT_CLUSTER_RADIUS: u32 = 50;

/// Default highest clustering zoom.
pub const DEFAULT_CLUSTER_MAX_ZOOM: f64 = 14.0;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "linemap.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            map: MapSettings {
                center_lon: DEFAULT_CENTER_LON,
                center_lat: DEFAULT_CENTER_LAT,
                zoom: DEFAULT_ZOOM,
                pitch: 0.0,
                bearing: 0.0,
                basemap: DEFAULT_BASEMAP.to_string(),
                mapbox_token: None,
            },
            layers: LayerSettings {
                heatmap_zoom_threshold: DEFAULT_HEATMAP_ZOOM_THRESHOLD,
                clustering: false,
                cluster_radius: DEFAULT_CLUSTER_RADIUS,
                cluster_max_zoom: DEFAULT_CLUSTER_MAX_ZOOM,
            },
            focus: FocusSettings {
                min_zoom: DEFAULT_MIN_FOCUS_ZOOM,
                ease_duration_ms: DEFAULT_EASE_DURATION_MS,
            },
            risk: RiskSettings {
                proximity_k: DEFAULT_PROXIMITY_K,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}

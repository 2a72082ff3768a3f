//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Initial camera and base style
    pub map: MapSettings,
    /// Event overlay settings
    pub layers: LayerSettings,
    /// Focus camera settings
    pub focus: FocusSettings,
    /// Risk model settings
    pub risk: RiskSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Map configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Initial center longitude in degrees
    pub center_lon: f64,
    /// Initial center latitude in degrees
    pub center_lat: f64,
    /// Initial zoom level (0-22)
    pub zoom: f64,
    /// Initial pitch in degrees (0-60)
    pub pitch: f64,
    /// Initial bearing in degrees
    pub bearing: f64,
    /// Basemap id from the style catalog
    pub basemap: String,
    /// Access token for vector basemaps (only required for mapbox-* basemaps)
    pub mapbox_token: Option<String>,
}

/// Event overlay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSettings {
    /// Zoom at which the heatmap hands over to points
    pub heatmap_zoom_threshold: f64,
    /// Cluster points above the threshold
    pub clustering: bool,
    /// Cluster radius in pixels
    pub cluster_radius: u32,
    /// Highest zoom at which points are clustered
    pub cluster_max_zoom: f64,
}

/// Focus configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusSettings {
    /// Lowest zoom the camera eases to when focusing a record
    pub min_zoom: f64,
    /// Camera ease duration in milliseconds
    pub ease_duration_ms: u64,
}

/// Risk model configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSettings {
    /// Proximity decay constant `k` in `1 / (1 + k·d²)`
    pub proximity_k: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

//! Rendering a [`ConfigFile`] back to `config.ini`.
//!
//! Every key is written with a short comment so the file doubles as
//! documentation of what can be set.

use std::path::Path;

use super::parser::basemap_ids;
use super::settings::ConfigFile;

/// Full `config.ini` text for `config`, one commented line per key.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mapbox_token = config.map.mapbox_token.as_deref().unwrap_or("");

    format!(
        r#"[map]
; Initial camera position
center_lon = {}
center_lat = {}
; Initial zoom level (0-22, default: 12)
zoom = {}
; Camera tilt in degrees (0-60) and rotation clockwise from north
pitch = {}
bearing = {}
; Base style, one of: {}
; mapbox-* basemaps need mapbox_token and fall back to imagery without it
basemap = {}
; Mapbox access token (only required for mapbox-* basemaps)
mapbox_token = {}

[layers]
; Zoom at which the severity heatmap is replaced by individual points (default: 9)
heatmap_zoom_threshold = {}
; Group nearby points into clusters above the threshold
clustering = {}
; Cluster radius in pixels (default: 50)
cluster_radius = {}
; Highest zoom at which points are clustered (default: 14)
cluster_max_zoom = {}

[focus]
; Lowest zoom the camera eases to when an event is focused (default: 14)
min_zoom = {}
; Camera ease duration in milliseconds (default: 1000)
ease_duration_ms = {}

[risk]
; Crossing proximity decay k in 1 / (1 + k * d^2), d in degrees (default: 10000)
proximity_k = {}

[logging]
; Log file path (cleared at the start of each session)
file = {}
"#,
        config.map.center_lon,
        config.map.center_lat,
        config.map.zoom,
        config.map.pitch,
        config.map.bearing,
        basemap_ids().join(", "),
        config.map.basemap,
        mapbox_token,
        config.layers.heatmap_zoom_threshold,
        config.layers.clustering,
        config.layers.cluster_radius,
        config.layers.cluster_max_zoom,
        config.focus.min_zoom,
        config.focus.ease_duration_ms,
        config.risk.proximity_k,
        path_to_string(&config.logging.file),
    )
}

/// Display form of `path` with the home directory shown as `~`.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::defaults::*;
    use super::super::settings::ConfigFile;
    use super::to_config_string;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.map.basemap = "mapbox-streets".to_string();
        config.map.mapbox_token = Some("pk.test".to_string());
        config.map.zoom = 7.5;
        config.layers.clustering = true;
        config.risk.proximity_k = 2500.0;
        config.logging.file = temp_dir.path().join("custom.log");

        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_defaults_round_trip_through_writer() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.map.center_lat, DEFAULT_CENTER_LAT);
        assert_eq!(loaded.layers.cluster_radius, DEFAULT_CLUSTER_RADIUS);
    }

    #[test]
    fn test_output_is_commented() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("[layers]"));
        assert!(text.contains("; Zoom at which"));
        assert!(text.contains("basemap = imagery"));
    }
}

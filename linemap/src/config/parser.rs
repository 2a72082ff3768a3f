//! Reading `config.ini` sections into a [`ConfigFile`].
//!
//! Values are checked with the same bounds `config set` enforces, so a
//! hand-edited file cannot smuggle in an out-of-range zoom or latitude.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{MAX_LAT, MAX_LON, MAX_PITCH, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};
use crate::style::{find_basemap, BASEMAPS};

/// Overlay every recognised key of `ini` on the defaults.
///
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("center_lon") {
            config.map.center_lon = parse_in_range("map", "center_lon", v, MIN_LON, MAX_LON)?;
        }
        if let Some(v) = section.get("center_lat") {
            config.map.center_lat = parse_in_range("map", "center_lat", v, MIN_LAT, MAX_LAT)?;
        }
        if let Some(v) = section.get("zoom") {
            config.map.zoom = parse_in_range("map", "zoom", v, MIN_ZOOM, MAX_ZOOM)?;
        }
        if let Some(v) = section.get("pitch") {
            config.map.pitch = parse_in_range("map", "pitch", v, 0.0, MAX_PITCH)?;
        }
        if let Some(v) = section.get("bearing") {
            config.map.bearing = parse_value("map", "bearing", v, "must be a number (degrees)")?;
        }
        if let Some(v) = section.get("basemap") {
            let v = v.trim().to_lowercase();
            if find_basemap(&v).is_none() {
                return Err(ConfigFileError::InvalidValue {
                    section: "map".to_string(),
                    key: "basemap".to_string(),
                    value: v,
                    reason: format!("must be one of: {}", basemap_ids().join(", ")),
                });
            }
            config.map.basemap = v;
        }
        if let Some(v) = section.get("mapbox_token") {
            let v = v.trim();
            if !v.is_empty() {
                config.map.mapbox_token = Some(v.to_string());
            }
        }
    }

    // [layers] section
    if let Some(section) = ini.section(Some("layers")) {
        if let Some(v) = section.get("heatmap_zoom_threshold") {
            config.layers.heatmap_zoom_threshold =
                parse_in_range("layers", "heatmap_zoom_threshold", v, MIN_ZOOM, MAX_ZOOM)?;
        }
        if let Some(v) = section.get("clustering") {
            config.layers.clustering = parse_bool(v);
        }
        if let Some(v) = section.get("cluster_radius") {
            config.layers.cluster_radius = parse_value(
                "layers",
                "cluster_radius",
                v,
                "must be a positive integer (pixels)",
            )?;
        }
        if let Some(v) = section.get("cluster_max_zoom") {
            config.layers.cluster_max_zoom =
                parse_in_range("layers", "cluster_max_zoom", v, MIN_ZOOM, MAX_ZOOM)?;
        }
    }

    // [focus] section
    if let Some(section) = ini.section(Some("focus")) {
        if let Some(v) = section.get("min_zoom") {
            config.focus.min_zoom = parse_in_range("focus", "min_zoom", v, MIN_ZOOM, MAX_ZOOM)?;
        }
        if let Some(v) = section.get("ease_duration_ms") {
            config.focus.ease_duration_ms = parse_value(
                "focus",
                "ease_duration_ms",
                v,
                "must be a positive integer (milliseconds)",
            )?;
        }
    }

    // [risk] section
    if let Some(section) = ini.section(Some("risk")) {
        if let Some(v) = section.get("proximity_k") {
            let k: f64 = parse_value("risk", "proximity_k", v, "must be a positive number")?;
            if k <= 0.0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "risk".to_string(),
                    key: "proximity_k".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive number".to_string(),
                });
            }
            config.risk.proximity_k = k;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
}

fn parse_in_range(
    section: &str,
    key: &str,
    value: &str,
    min: f64,
    max: f64,
) -> Result<f64, ConfigFileError> {
    let reason = format!("must be a number between {} and {}", min, max);
    let parsed: f64 = parse_value(section, key, value, &reason)?;
    if !(min..=max).contains(&parsed) {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason,
        });
    }
    Ok(parsed)
}

/// Ids of every catalog basemap.
pub(super) fn basemap_ids() -> Vec<&'static str> {
    BASEMAPS.iter().map(|b| b.id).collect()
}

/// `true`, `yes`, `on` or `1` in any case; everything else is false.
pub(super) fn parse_bool(value: &str) -> bool {
    ["true", "yes", "on", "1"]
        .iter()
        .any(|w| w.eq_ignore_ascii_case(value.trim()))
}

/// `~/x` becomes `$HOME/x`; other paths are kept as written.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

//! Dotted-key access to [`ConfigFile`] for `linemap config get/set`.
//!
//! Every [`ConfigKey`] names one field as `section.key` and carries a
//! [`ValueSpecification`] that a new value must satisfy before it is stored.

use std::str::FromStr;
use thiserror::Error;

use super::parser::{expand_tilde, parse_bool};
use super::settings::ConfigFile;
use super::writer::path_to_string;
use crate::coord::{MAX_LAT, MAX_LON, MAX_PITCH, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};
use crate::style::{find_basemap, BASEMAPS};

/// Failure to resolve a key or accept a value for it.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The value was rejected for this key
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// One settable field of [`ConfigFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Map settings
    MapCenterLon,
    MapCenterLat,
    MapZoom,
    MapPitch,
    MapBearing,
    MapBasemap,
    MapMapboxToken,

    // Layer settings
    LayersHeatmapZoomThreshold,
    LayersClustering,
    LayersClusterRadius,
    LayersClusterMaxZoom,

    // Focus settings
    FocusMinZoom,
    FocusEaseDurationMs,

    // Risk settings
    RiskProximityK,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Dotted name as typed on the command line, e.g. `map.basemap`.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::MapCenterLon => "map.center_lon",
            ConfigKey::MapCenterLat => "map.center_lat",
            ConfigKey::MapZoom => "map.zoom",
            ConfigKey::MapPitch => "map.pitch",
            ConfigKey::MapBearing => "map.bearing",
            ConfigKey::MapBasemap => "map.basemap",
            ConfigKey::MapMapboxToken => "map.mapbox_token",
            ConfigKey::LayersHeatmapZoomThreshold => "layers.heatmap_zoom_threshold",
            ConfigKey::LayersClustering => "layers.clustering",
            ConfigKey::LayersClusterRadius => "layers.cluster_radius",
            ConfigKey::LayersClusterMaxZoom => "layers.cluster_max_zoom",
            ConfigKey::FocusMinZoom => "focus.min_zoom",
            ConfigKey::FocusEaseDurationMs => "focus.ease_duration_ms",
            ConfigKey::RiskProximityK => "risk.proximity_k",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Name inside the INI section, e.g. `basemap`.
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Current value rendered as text; unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MapCenterLon => config.map.center_lon.to_string(),
            ConfigKey::MapCenterLat => config.map.center_lat.to_string(),
            ConfigKey::MapZoom => config.map.zoom.to_string(),
            ConfigKey::MapPitch => config.map.pitch.to_string(),
            ConfigKey::MapBearing => config.map.bearing.to_string(),
            ConfigKey::MapBasemap => config.map.basemap.clone(),
            ConfigKey::MapMapboxToken => config.map.mapbox_token.clone().unwrap_or_default(),
            ConfigKey::LayersHeatmapZoomThreshold => {
                config.layers.heatmap_zoom_threshold.to_string()
            }
            ConfigKey::LayersClustering => config.layers.clustering.to_string(),
            ConfigKey::LayersClusterRadius => config.layers.cluster_radius.to_string(),
            ConfigKey::LayersClusterMaxZoom => config.layers.cluster_max_zoom.to_string(),
            ConfigKey::FocusMinZoom => config.focus.min_zoom.to_string(),
            ConfigKey::FocusEaseDurationMs => config.focus.ease_duration_ms.to_string(),
            ConfigKey::RiskProximityK => config.risk.proximity_k.to_string(),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Store `value` after validating it. `config` is untouched on error.
    ///
    /// An empty value clears `map.mapbox_token`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        let value = value.trim();
        match self {
            ConfigKey::MapCenterLon => config.map.center_lon = self.parse(value)?,
            ConfigKey::MapCenterLat => config.map.center_lat = self.parse(value)?,
            ConfigKey::MapZoom => config.map.zoom = self.parse(value)?,
            ConfigKey::MapPitch => config.map.pitch = self.parse(value)?,
            ConfigKey::MapBearing => config.map.bearing = self.parse(value)?,
            ConfigKey::MapBasemap => config.map.basemap = value.to_lowercase(),
            ConfigKey::MapMapboxToken => config.map.mapbox_token = optional_string(value),
            ConfigKey::LayersHeatmapZoomThreshold => {
                config.layers.heatmap_zoom_threshold = self.parse(value)?
            }
            ConfigKey::LayersClustering => config.layers.clustering = parse_bool(value),
            ConfigKey::LayersClusterRadius => config.layers.cluster_radius = self.parse(value)?,
            ConfigKey::LayersClusterMaxZoom => config.layers.cluster_max_zoom = self.parse(value)?,
            ConfigKey::FocusMinZoom => config.focus.min_zoom = self.parse(value)?,
            ConfigKey::FocusEaseDurationMs => config.focus.ease_duration_ms = self.parse(value)?,
            ConfigKey::RiskProximityK => config.risk.proximity_k = self.parse(value)?,
            ConfigKey::LoggingFile => config.logging.file = expand_tilde(value),
        }
        Ok(())
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigKeyError> {
        value.parse().map_err(|_| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: format!("cannot parse '{}'", value),
        })
    }

    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::MapCenterLon => Box::new(RangeSpec::new(MIN_LON, MAX_LON)),
            ConfigKey::MapCenterLat => Box::new(RangeSpec::new(MIN_LAT, MAX_LAT)),
            ConfigKey::MapZoom => Box::new(RangeSpec::new(MIN_ZOOM, MAX_ZOOM)),
            ConfigKey::MapPitch => Box::new(RangeSpec::new(0.0, MAX_PITCH)),
            ConfigKey::MapBearing => Box::new(NumberSpec),
            ConfigKey::MapBasemap => Box::new(BasemapSpec),
            ConfigKey::MapMapboxToken => Box::new(TokenSpec),
            ConfigKey::LayersHeatmapZoomThreshold => Box::new(RangeSpec::new(MIN_ZOOM, MAX_ZOOM)),
            ConfigKey::LayersClustering => Box::new(BooleanSpec),
            ConfigKey::LayersClusterRadius => Box::new(PositiveIntegerSpec),
            ConfigKey::LayersClusterMaxZoom => Box::new(RangeSpec::new(MIN_ZOOM, MAX_ZOOM)),
            ConfigKey::FocusMinZoom => Box::new(RangeSpec::new(MIN_ZOOM, MAX_ZOOM)),
            ConfigKey::FocusEaseDurationMs => Box::new(PositiveIntegerSpec),
            ConfigKey::RiskProximityK => Box::new(PositiveNumberSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Every key, in `config list` order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::MapCenterLon,
            ConfigKey::MapCenterLat,
            ConfigKey::MapZoom,
            ConfigKey::MapPitch,
            ConfigKey::MapBearing,
            ConfigKey::MapBasemap,
            ConfigKey::MapMapboxToken,
            ConfigKey::LayersHeatmapZoomThreshold,
            ConfigKey::LayersClustering,
            ConfigKey::LayersClusterRadius,
            ConfigKey::LayersClusterMaxZoom,
            ConfigKey::FocusMinZoom,
            ConfigKey::FocusEaseDurationMs,
            ConfigKey::RiskProximityK,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value specifications
// ============================================================================

/// A rule a raw value must follow; `Err` carries the reason shown to the user.
trait ValueSpecification {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// An access token: empty, or a single word without whitespace.
struct TokenSpec;

impl ValueSpecification for TokenSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.chars().any(char::is_whitespace) {
            Err("must not contain whitespace".to_string())
        } else {
            Ok(())
        }
    }
}

/// Any finite number.
struct NumberSpec;

impl ValueSpecification for NumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(()),
            _ => Err("must be a number".to_string()),
        }
    }
}

/// A number in `min..=max`.
struct RangeSpec {
    min: f64,
    max: f64,
}

impl RangeSpec {
    fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl ValueSpecification for RangeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let reason = || format!("must be a number between {} and {}", self.min, self.max);
        let n = value.parse::<f64>().map_err(|_| reason())?;
        if (self.min..=self.max).contains(&n) {
            Ok(())
        } else {
            Err(reason())
        }
    }
}

/// A whole number above zero.
struct PositiveIntegerSpec;

impl ValueSpecification for PositiveIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u32>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err("must be a positive integer".to_string()),
        }
    }
}

/// A finite number above zero.
struct PositiveNumberSpec;

impl ValueSpecification for PositiveNumberSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<f64>() {
            Ok(n) if n > 0.0 && n.is_finite() => Ok(()),
            _ => Err("must be a positive number".to_string()),
        }
    }
}

/// Spellings [`parse_bool`] understands.
const BOOLEAN_WORDS: [&str; 8] = ["true", "false", "yes", "no", "on", "off", "1", "0"];

struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if BOOLEAN_WORDS.iter().any(|w| w.eq_ignore_ascii_case(value)) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", BOOLEAN_WORDS.join(", ")))
        }
    }
}

/// An id from [`BASEMAPS`].
struct BasemapSpec;

impl ValueSpecification for BasemapSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if find_basemap(&value.to_lowercase()).is_some() {
            Ok(())
        } else {
            let ids: Vec<&str> = BASEMAPS.iter().map(|b| b.id).collect();
            Err(format!("must be one of: {}", ids.join(", ")))
        }
    }
}

struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value {
            "" => Err("must not be empty".to_string()),
            "~" | "/" => Err("must name a file".to_string()),
            _ => Ok(()),
        }
    }
}

fn optional_string(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

//! Map view configuration.

use super::settings::ConfigFile;
use crate::coord::{Camera, LngLat};
use crate::focus::{DEFAULT_EASE_DURATION_MS, DEFAULT_MIN_FOCUS_ZOOM};
use crate::layers::DEFAULT_HEATMAP_ZOOM_THRESHOLD;
use crate::risk::{RiskModel, DEFAULT_PROXIMITY_K};
use crate::style::DEFAULT_BASEMAP;
use crate::surface::ClusterOptions;

use super::defaults::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, DEFAULT_ZOOM};

/// Configuration for a map view.
///
/// Groups the parameters a [`crate::view::MapView`] needs at construction,
/// with defaults matching a fresh `config.ini`.
///
/// # Example
///
/// ```
/// use linemap::config::MapConfig;
/// use linemap::surface::ClusterOptions;
///
/// let config = MapConfig::default()
///     .with_basemap("topo")
///     .with_clustering(ClusterOptions::default());
/// assert_eq!(config.basemap(), "topo");
/// assert!(config.clustering().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Initial camera
    camera: Camera,
    /// Requested basemap id
    basemap: String,
    /// Access token for token-gated basemaps
    mapbox_token: Option<String>,
    /// Heatmap/points crossover zoom
    heatmap_zoom_threshold: f64,
    /// Point clustering, disabled when `None`
    clustering: Option<ClusterOptions>,
    /// Lowest zoom for event focus
    focus_min_zoom: f64,
    /// Camera ease duration for event focus
    ease_duration_ms: u64,
    /// Crossing proximity decay constant
    proximity_k: f64,
}

impl MapConfig {
    /// Create a configuration centered on `camera` with default layers.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    pub fn with_basemap(mut self, basemap: impl Into<String>) -> Self {
        self.basemap = basemap.into();
        self
    }

    pub fn with_mapbox_token(mut self, token: impl Into<String>) -> Self {
        self.mapbox_token = Some(token.into());
        self
    }

    pub fn with_heatmap_zoom_threshold(mut self, zoom: f64) -> Self {
        self.heatmap_zoom_threshold = zoom;
        self
    }

    /// Enable point clustering on the events source.
    pub fn with_clustering(mut self, options: ClusterOptions) -> Self {
        self.clustering = Some(options);
        self
    }

    pub fn with_focus_min_zoom(mut self, zoom: f64) -> Self {
        self.focus_min_zoom = zoom;
        self
    }

    pub fn with_ease_duration(mut self, duration_ms: u64) -> Self {
        self.ease_duration_ms = duration_ms;
        self
    }

    pub fn with_proximity_k(mut self, k: f64) -> Self {
        self.proximity_k = k;
        self
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn basemap(&self) -> &str {
        &self.basemap
    }

    pub fn mapbox_token(&self) -> Option<&str> {
        self.mapbox_token.as_deref()
    }

    pub fn heatmap_zoom_threshold(&self) -> f64 {
        self.heatmap_zoom_threshold
    }

    pub fn clustering(&self) -> Option<ClusterOptions> {
        self.clustering
    }

    pub fn focus_min_zoom(&self) -> f64 {
        self.focus_min_zoom
    }

    pub fn ease_duration_ms(&self) -> u64 {
        self.ease_duration_ms
    }

    pub fn proximity_k(&self) -> f64 {
        self.proximity_k
    }

    /// Risk model using the configured proximity constant.
    pub fn risk_model(&self) -> RiskModel {
        RiskModel::new().with_proximity_k(self.proximity_k)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            camera: Camera::new(LngLat::new(DEFAULT_CENTER_LON, DEFAULT_CENTER_LAT), DEFAULT_ZOOM),
            basemap: DEFAULT_BASEMAP.to_string(),
            mapbox_token: None,
            heatmap_zoom_threshold: DEFAULT_HEATMAP_ZOOM_THRESHOLD,
            clustering: None,
            focus_min_zoom: DEFAULT_MIN_FOCUS_ZOOM,
            ease_duration_ms: DEFAULT_EASE_DURATION_MS,
            proximity_k: DEFAULT_PROXIMITY_K,
        }
    }
}

impl From<&ConfigFile> for MapConfig {
    fn from(config: &ConfigFile) -> Self {
        let camera = Camera::new(
            LngLat::new(config.map.center_lon, config.map.center_lat),
            config.map.zoom,
        )
        .with_pitch(config.map.pitch)
        .with_bearing(config.map.bearing);

        let clustering = config.layers.clustering.then_some(ClusterOptions {
            radius: config.layers.cluster_radius,
            max_zoom: config.layers.cluster_max_zoom,
        });

        Self {
            camera,
            basemap: config.map.basemap.clone(),
            mapbox_token: config.map.mapbox_token.clone(),
            heatmap_zoom_threshold: config.layers.heatmap_zoom_threshold,
            clustering,
            focus_min_zoom: config.focus.min_zoom,
            ease_duration_ms: config.focus.ease_duration_ms,
            proximity_k: config.risk.proximity_k,
        }
    }
}

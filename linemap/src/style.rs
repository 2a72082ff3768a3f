//! Base style catalog.
//!
//! A base style is opaque to the engine: either a URL the surface resolves or
//! an inline style document. The catalog provides raster basemaps that need
//! no credentials and vector styles that need a Mapbox access token. Any
//! unknown or unavailable basemap resolves to [`DEFAULT_BASEMAP`].

use std::fmt;

use serde_json::{json, Value};

/// Basemap used when nothing else resolves.
pub const DEFAULT_BASEMAP: &str = "imagery";

const MAPBOX_STYLE_ENDPOINT: &str = "https://api.mapbox.com/styles/v1";
const HILLSHADE_URL: &str =
    "https://services.arcgisonline.com/arcgis/rest/services/Elevation/World_Hillshade/MapServer/tile/{z}/{y}/{x}";

/// Reference to a base style document.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleRef {
    /// Style fetched by the surface
    Url(String),
    /// Style document supplied inline
    Inline(Value),
}

impl StyleRef {
    /// Short label for logs and notices.
    pub fn label(&self) -> String {
        match self {
            StyleRef::Url(url) => url.split('?').next().unwrap_or(url).to_string(),
            StyleRef::Inline(doc) => doc
                .get("name")
                .and_then(Value::as_str)
                .map(|name| format!("inline:{}", name))
                .unwrap_or_else(|| "inline".to_string()),
        }
    }
}

impl fmt::Display for StyleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Who serves a basemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Raster XYZ tiles, no credentials
    Raster,
    /// Vector style, needs an access token
    Mapbox,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Basemap {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub provider: Provider,
    /// Tile URL template (raster) or `owner/style` path (vector)
    pub source: &'static str,
    pub attribution: &'static str,
    /// Whether the basemap pairs well with the terrain toggle
    pub terrain: bool,
}

/// The basemap catalog.
pub const BASEMAPS: &[Basemap] = &[
    Basemap {
        id: "imagery",
        name: "Satellite",
        description: "High resolution imagery",
        provider: Provider::Raster,
        source: "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: "© Esri, Maxar, Earthstar Geographics, and the GIS User Community",
        terrain: false,
    },
    Basemap {
        id: "canvas",
        name: "Light canvas",
        description: "Light gray reference map",
        provider: Provider::Raster,
        source: "https://services.arcgisonline.com/arcgis/rest/services/Canvas/World_Light_Gray_Base/MapServer/tile/{z}/{y}/{x}",
        attribution: "© Esri",
        terrain: false,
    },
    Basemap {
        id: "terrain",
        name: "Terrain",
        description: "Raster topographic relief",
        provider: Provider::Raster,
        source: "https://services.arcgisonline.com/arcgis/rest/services/World_Terrain_Base/MapServer/tile/{z}/{y}/{x}",
        attribution: "© Esri",
        terrain: false,
    },
    Basemap {
        id: "topo",
        name: "Topographic",
        description: "Full topographic map",
        provider: Provider::Raster,
        source: "https://services.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}",
        attribution: "© Esri",
        terrain: false,
    },
    Basemap {
        id: "streets",
        name: "Streets",
        description: "Streets and highways",
        provider: Provider::Raster,
        source: "https://services.arcgisonline.com/ArcGIS/rest/services/World_Street_Map/MapServer/tile/{z}/{y}/{x}",
        attribution: "© Esri",
        terrain: false,
    },
    Basemap {
        id: "osm",
        name: "OpenStreetMap",
        description: "Collaborative world map",
        provider: Provider::Raster,
        source: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "© OpenStreetMap contributors",
        terrain: false,
    },
    Basemap {
        id: "mapbox-satellite",
        name: "Satellite (Mapbox)",
        description: "Imagery with labels and relief",
        provider: Provider::Mapbox,
        source: "mapbox/satellite-streets-v12",
        attribution: "© Mapbox © OpenStreetMap",
        terrain: true,
    },
    Basemap {
        id: "mapbox-streets",
        name: "Streets (Mapbox)",
        description: "Vector map with roads and POIs",
        provider: Provider::Mapbox,
        source: "mapbox/streets-v12",
        attribution: "© Mapbox © OpenStreetMap",
        terrain: true,
    },
    Basemap {
        id: "mapbox-outdoors",
        name: "Outdoors (Mapbox)",
        description: "Terrain and trails with contours",
        provider: Provider::Mapbox,
        source: "mapbox/outdoors-v12",
        attribution: "© Mapbox © OpenStreetMap",
        terrain: true,
    },
];

/// Look up a basemap by id.
pub fn find_basemap(id: &str) -> Option<&'static Basemap> {
    BASEMAPS.iter().find(|b| b.id == id)
}

/// The default imagery basemap.
pub fn default_basemap() -> &'static Basemap {
    // The catalog starts with the default entry
    find_basemap(DEFAULT_BASEMAP).unwrap_or(&BASEMAPS[0])
}

/// Resolve a requested basemap id to a usable catalog entry.
///
/// Mapbox styles are only usable with an access token; without one, or for
/// an unknown id, the default imagery basemap is returned.
pub fn resolve_basemap(requested: Option<&str>, mapbox_token: Option<&str>) -> &'static Basemap {
    let Some(id) = requested else {
        return default_basemap();
    };
    match find_basemap(id) {
        Some(basemap) if basemap.provider == Provider::Raster => basemap,
        Some(basemap) if mapbox_token.is_some_and(|t| !t.is_empty()) => basemap,
        Some(basemap) => {
            tracing::warn!(
                basemap = basemap.id,
                "Mapbox basemap unavailable without an access token, using default"
            );
            default_basemap()
        }
        None => {
            tracing::warn!(basemap = id, "Unknown basemap, using default");
            default_basemap()
        }
    }
}

impl Basemap {
    /// Style reference the surface should load for this basemap.
    ///
    /// Raster basemaps produce an inline document with one raster layer
    /// (plus a translucent hillshade over imagery and terrain). Vector
    /// basemaps produce a style URL carrying `token`.
    pub fn style(&self, mapbox_token: Option<&str>) -> StyleRef {
        match self.provider {
            Provider::Mapbox => {
                let mut url = format!("{}/{}", MAPBOX_STYLE_ENDPOINT, self.source);
                if let Some(token) = mapbox_token {
                    url.push_str("?access_token=");
                    url.push_str(token);
                }
                StyleRef::Url(url)
            }
            Provider::Raster => StyleRef::Inline(self.raster_document()),
        }
    }

    fn raster_document(&self) -> Value {
        let mut sources = json!({
            "raster-base": {
                "type": "raster",
                "tiles": [self.source],
                "tileSize": 256,
                "attribution": self.attribution,
                "scheme": "xyz",
                "maxzoom": 19
            }
        });
        let mut layers = vec![json!({
            "id": "raster-base",
            "type": "raster",
            "source": "raster-base",
            "minzoom": 0,
            "maxzoom": 22
        })];

        if matches!(self.id, "imagery" | "terrain") {
            sources["esri-hillshade"] = json!({
                "type": "raster",
                "tiles": [HILLSHADE_URL],
                "tileSize": 256,
                "scheme": "xyz"
            });
            layers.push(json!({
                "id": "esri-hillshade",
                "type": "raster",
                "source": "esri-hillshade",
                "paint": { "raster-opacity": 0.3 }
            }));
        }

        json!({
            "version": 8,
            "name": self.id,
            "sources": sources,
            "layers": layers
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_imagery() {
        assert_eq!(resolve_basemap(None, None).id, "imagery");
        assert_eq!(resolve_basemap(Some("nope"), None).id, "imagery");
        assert_eq!(resolve_basemap(Some("topo"), None).id, "topo");
    }

    #[test]
    fn test_mapbox_requires_token() {
        assert_eq!(resolve_basemap(Some("mapbox-streets"), None).id, "imagery");
        assert_eq!(resolve_basemap(Some("mapbox-streets"), Some("")).id, "imagery");
        assert_eq!(
            resolve_basemap(Some("mapbox-streets"), Some("pk.abc")).id,
            "mapbox-streets"
        );
    }

    #[test]
    fn test_raster_style_document() {
        let StyleRef::Inline(doc) = default_basemap().style(None) else {
            panic!("imagery should be an inline style");
        };
        assert_eq!(doc["version"], 8);
        assert_eq!(doc["layers"].as_array().unwrap().len(), 2);
        assert_eq!(doc["layers"][1]["id"], "esri-hillshade");

        let StyleRef::Inline(doc) = find_basemap("osm").unwrap().style(None) else {
            panic!("osm should be an inline style");
        };
        assert_eq!(doc["layers"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_catalog_providers() {
        let osm = find_basemap("osm").unwrap();
        assert_eq!(osm.provider, Provider::Raster);
        assert_eq!(resolve_basemap(Some("osm"), None).id, "osm");

        let StyleRef::Inline(doc) = osm.style(None) else {
            panic!("osm should be an inline style");
        };
        assert_eq!(doc["layers"][0]["source"], "raster-base");
        assert_eq!(doc["sources"]["raster-base"]["attribution"], osm.attribution);

        for basemap in BASEMAPS.iter().filter(|b| b.id.starts_with("mapbox-")) {
            assert_eq!(basemap.provider, Provider::Mapbox);
            assert_eq!(resolve_basemap(Some(basemap.id), None).id, DEFAULT_BASEMAP);
        }
    }

    #[test]
    fn test_vector_style_url() {
        let style = find_basemap("mapbox-outdoors").unwrap().style(Some("pk.1"));
        assert_eq!(
            style,
            StyleRef::Url("https://api.mapbox.com/styles/v1/mapbox/outdoors-v12?access_token=pk.1".into())
        );
        assert_eq!(
            style.label(),
            "https://api.mapbox.com/styles/v1/mapbox/outdoors-v12"
        );
    }

    #[test]
    fn test_style_equality_drives_noop_swaps() {
        let a = find_basemap("canvas").unwrap().style(None);
        let b = find_basemap("canvas").unwrap().style(None);
        let c = find_basemap("streets").unwrap().style(None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.label(), "inline:canvas");
    }
}

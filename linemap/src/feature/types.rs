//! Domain record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coord::LngLat;

use super::FeatureError;

/// Ordered hazard classification.
///
/// `Low < Medium < High`. Drives color, heatmap weight and point sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    /// Lowercase key used in paint expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = FeatureError;

    /// Accepts English keys and the Portuguese labels used by upstream exports.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baixa" => Ok(Severity::Low),
            "medium" | "média" | "media" => Ok(Severity::Medium),
            "high" | "alta" => Ok(Severity::High),
            _ => Err(FeatureError::InvalidSeverity(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = FeatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work status of a record.
///
/// Unknown upstream values are kept verbatim in [`Status::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Resolved,
    InProgress,
    Pending,
    Alert,
    Critical,
    Other(String),
}

impl Status {
    /// Canonical key for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Status::Resolved => "resolved",
            Status::InProgress => "in_progress",
            Status::Pending => "pending",
            Status::Alert => "alert",
            Status::Critical => "critical",
            Status::Other(s) => s.as_str(),
        }
    }

    /// True when the status indicates ongoing degradation of the asset.
    pub fn is_degrading(&self) -> bool {
        matches!(self, Status::Critical | Status::Alert | Status::Pending)
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "resolved" | "ok" | "concluído" | "concluido" => Status::Resolved,
            "in_progress" | "in progress" | "em andamento" => Status::InProgress,
            "pending" | "pendente" => Status::Pending,
            "alert" | "alerta" => Status::Alert,
            "critical" | "crítico" | "critico" => Status::Critical,
            _ => Status::Other(value),
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Status::from(value.to_string())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature geometry in GeoJSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(LngLat),
    MultiPoint(Vec<LngLat>),
    LineString(Vec<LngLat>),
    Polygon(Vec<Vec<LngLat>>),
}

impl Geometry {
    /// Representative coordinate used for camera targets and popups.
    ///
    /// Points anchor on themselves, lines on their middle vertex, polygons
    /// and multi-points on the vertex average of their first ring.
    pub fn anchor(&self) -> Option<LngLat> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::LineString(line) => line.get(line.len() / 2).copied(),
            Geometry::MultiPoint(points) => average(points),
            Geometry::Polygon(rings) => rings.first().and_then(|ring| average(ring)),
        }
    }

    /// The vertices to decompose into segments: the line itself or the
    /// outer polygon ring. Points have no path.
    pub fn path(&self) -> &[LngLat] {
        match self {
            Geometry::LineString(line) => line,
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
            Geometry::Point(_) | Geometry::MultiPoint(_) => &[],
        }
    }

    /// Every vertex of the geometry.
    pub fn vertices(&self) -> Vec<LngLat> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.clone(),
            Geometry::Polygon(rings) => rings.iter().flatten().copied().collect(),
        }
    }
}

fn average(points: &[LngLat]) -> Option<LngLat> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lon, lat) = points
        .iter()
        .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon, lat + p.lat));
    Some(LngLat::new(lon / n, lat / n))
}

/// One renderable entity supplied by upstream collaborators.
///
/// The engine treats records as read-only; render properties are always
/// derived on copies (see [`FeatureRecord::to_feature`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub id: String,
    pub geometry: Geometry,
    pub severity: Severity,
    pub status: Status,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Free-form descriptive fields (`name`, `line`, `region`, ...)
    pub properties: Map<String, Value>,
}

impl FeatureRecord {
    /// Create a point record with no timestamps or extra properties.
    pub fn point(id: impl Into<String>, at: LngLat, severity: Severity, status: Status) -> Self {
        Self {
            id: id.into(),
            geometry: Geometry::Point(at),
            severity,
            status,
            started_at: None,
            ended_at: None,
            properties: Map::new(),
        }
    }

    /// Set the start timestamp.
    pub fn with_started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    /// Set a descriptive property.
    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// String property, if present and a string.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// Numeric property, if present and a number.
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    /// Display name (`name`, falling back to `nome`).
    pub fn name(&self) -> Option<&str> {
        self.property_str("name").or_else(|| self.property_str("nome"))
    }

    /// Coordinate the camera and popup anchor on.
    pub fn anchor(&self) -> Option<LngLat> {
        self.geometry.anchor()
    }
}

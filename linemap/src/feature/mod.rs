//! Feature records and GeoJSON feature collections.
//!
//! Upstream collaborators hand the engine a feature collection with a property
//! bag per feature. This module converts between that wire shape and the typed
//! [`FeatureRecord`] the engine works with. Conversion reads:
//!
//! - `id` from the feature id or the `id` property
//! - `severity` (`low|medium|high`, Portuguese labels accepted)
//! - `status`
//! - `start` / `end` RFC 3339 timestamps
//!
//! Everything else stays in the property bag untouched.
//!
//! # Example
//!
//! ```
//! use linemap::feature::{parse_records, Severity};
//!
//! let json = r#"{
//!     "type": "FeatureCollection",
//!     "features": [{
//!         "type": "Feature",
//!         "id": "ev-1",
//!         "geometry": { "type": "Point", "coordinates": [-46.6, -23.5] },
//!         "properties": { "severity": "high", "status": "pending" }
//!     }]
//! }"#;
//!
//! let records = parse_records(json).unwrap();
//! assert_eq!(records[0].id, "ev-1");
//! assert_eq!(records[0].severity, Severity::High);
//! ```

mod types;

pub use types::{FeatureRecord, Geometry, Severity, Status};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading feature collections.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Feature has neither a feature id nor an `id` property.
    #[error("Feature #{0} has no id")]
    MissingId(usize),

    /// Severity label not recognised.
    #[error("Invalid severity '{0}' (expected low, medium or high)")]
    InvalidSeverity(String),

    /// Timestamp property could not be parsed.
    #[error("Invalid timestamp in '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    /// Malformed JSON document.
    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A GeoJSON feature collection; the payload of every map source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collection holding the given features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Build a render payload from records.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureRecord>,
    {
        Self {
            features: records.into_iter().map(FeatureRecord::to_feature).collect(),
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if the collection holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Convert every feature into a typed record.
    pub fn to_records(&self) -> Result<Vec<FeatureRecord>, FeatureError> {
        self.features
            .iter()
            .enumerate()
            .map(|(index, feature)| FeatureRecord::from_feature(index, feature))
            .collect()
    }
}

/// Parse a GeoJSON feature collection document.
pub fn parse_collection(json: &str) -> Result<FeatureCollection, FeatureError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a GeoJSON feature collection document straight into records.
pub fn parse_records(json: &str) -> Result<Vec<FeatureRecord>, FeatureError> {
    parse_collection(json)?.to_records()
}

impl FeatureRecord {
    /// Read a record from a GeoJSON feature.
    ///
    /// `index` is only used for error reporting. Missing severity defaults to
    /// `low` and missing status to `pending`.
    pub fn from_feature(index: usize, feature: &Feature) -> Result<Self, FeatureError> {
        let props = &feature.properties;

        let id = feature
            .id
            .as_ref()
            .or_else(|| props.get("id"))
            .and_then(value_to_id)
            .ok_or(FeatureError::MissingId(index))?;

        let severity = match props.get("severity").or_else(|| props.get("criticidade")) {
            Some(Value::String(s)) => s.parse()?,
            Some(other) => return Err(FeatureError::InvalidSeverity(other.to_string())),
            None => Severity::Low,
        };

        let status = props
            .get("status")
            .and_then(Value::as_str)
            .map(Status::from)
            .unwrap_or(Status::Pending);

        let mut properties = props.clone();
        for key in ["id", "severity", "criticidade", "status", "start", "end"] {
            properties.remove(key);
        }

        Ok(Self {
            id,
            geometry: feature.geometry.clone(),
            severity,
            status,
            started_at: timestamp(props, "start")?,
            ended_at: timestamp(props, "end")?,
            properties,
        })
    }

    /// Render copy of this record as a GeoJSON feature.
    ///
    /// The canonical `id`, `severity` and `status` keys are written into the
    /// property bag so paint expressions and click handlers can read them.
    pub fn to_feature(&self) -> Feature {
        let mut properties = self.properties.clone();
        properties.insert("id".into(), Value::String(self.id.clone()));
        properties.insert("severity".into(), Value::String(self.severity.to_string()));
        properties.insert("status".into(), Value::String(self.status.to_string()));
        if let Some(start) = self.started_at {
            properties.insert("start".into(), Value::String(start.to_rfc3339()));
        }
        if let Some(end) = self.ended_at {
            properties.insert("end".into(), Value::String(end.to_rfc3339()));
        }
        Feature {
            id: Some(Value::String(self.id.clone())),
            geometry: self.geometry.clone(),
            properties,
        }
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn timestamp(props: &Map<String, Value>, field: &str) -> Result<Option<DateTime<Utc>>, FeatureError> {
    match props.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| FeatureError::InvalidTimestamp {
                field: field.to_string(),
                value: s.clone(),
            }),
        Some(other) => Err(FeatureError::InvalidTimestamp {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

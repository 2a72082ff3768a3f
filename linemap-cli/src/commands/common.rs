//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use linemap::coord::LngLat;
use linemap::feature::{parse_collection, parse_records, FeatureRecord, Severity};

use crate::error::CliError;

/// Severity selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
        }
    }
}

/// Read a file to a string.
pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.display().to_string(),
        error,
    })
}

/// Load feature records from a GeoJSON FeatureCollection.
pub fn load_records(path: &Path) -> Result<Vec<FeatureRecord>, CliError> {
    let json = read_file(path)?;
    parse_records(&json).map_err(|error| CliError::Feature {
        path: path.display().to_string(),
        error,
    })
}

/// Load every line (or polygon outer ring) of a GeoJSON FeatureCollection.
pub fn load_lines(path: &Path) -> Result<Vec<Vec<LngLat>>, CliError> {
    let json = read_file(path)?;
    let collection = parse_collection(&json).map_err(|error| CliError::Feature {
        path: path.display().to_string(),
        error,
    })?;
    Ok(collection
        .features
        .iter()
        .map(|f| f.geometry.path().to_vec())
        .filter(|path| path.len() >= 2)
        .collect())
}

/// Load lines from several files into one list.
pub fn load_all_lines(paths: &[impl AsRef<Path>]) -> Result<Vec<Vec<LngLat>>, CliError> {
    let mut lines = Vec::new();
    for path in paths {
        lines.extend(load_lines(path.as_ref())?);
    }
    Ok(lines)
}

/// Load the corridor: the first line of the file.
pub fn load_corridor(path: &Path) -> Result<Vec<LngLat>, CliError> {
    load_lines(path)?
        .into_iter()
        .next()
        .ok_or_else(|| CliError::InvalidInput {
            path: path.display().to_string(),
            reason: "no line geometry with at least two vertices".to_string(),
        })
}

/// Parse a `lon,lat` pair.
pub fn parse_lng_lat(text: &str) -> Result<LngLat, CliError> {
    let invalid = || CliError::InvalidArgument(format!("'{}' is not a lon,lat pair", text));
    let (lon, lat) = text.split_once(',').ok_or_else(invalid)?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    LngLat::validated(lon, lat).map_err(|e| CliError::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LINES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "id": "l1", "properties": {},
              "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] } },
            { "type": "Feature", "id": "p1", "properties": {},
              "geometry": { "type": "Point", "coordinates": [0.5, 0.5] } }
        ]
    }"#;

    #[test]
    fn test_parse_lng_lat() {
        assert_eq!(parse_lng_lat("-46.6,-23.5").unwrap(), LngLat::new(-46.6, -23.5));
        assert_eq!(parse_lng_lat(" 10 , 20 ").unwrap(), LngLat::new(10.0, 20.0));
        assert!(parse_lng_lat("10").is_err());
        assert!(parse_lng_lat("a,b").is_err());
        assert!(parse_lng_lat("0,95").is_err());
    }

    #[test]
    fn test_load_lines_skips_points() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lines.geojson");
        std::fs::write(&path, LINES).unwrap();

        let lines = load_lines(&path).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(load_corridor(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_corridor_without_lines_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.geojson");
        std::fs::write(&path, r#"{ "type": "FeatureCollection", "features": [] }"#).unwrap();

        assert!(matches!(
            load_corridor(&path),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_records(Path::new("/nonexistent/records.geojson")).unwrap_err();
        assert!(matches!(err, CliError::FileRead { .. }));
    }
}

//! Crossing points and their summary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::LngLat;

/// Closed set of obstacle classes a corridor can cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Highway,
    Railway,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 2] = [ObstacleKind::Highway, ObstacleKind::Railway];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Highway => "highway",
            ObstacleKind::Railway => "railway",
        }
    }
}

impl fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObstacleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "highway" | "road" | "rodovia" => Ok(ObstacleKind::Highway),
            "railway" | "rail" | "ferrovia" => Ok(ObstacleKind::Railway),
            other => Err(format!(
                "Unknown obstacle kind '{}' (expected highway or railway)",
                other
            )),
        }
    }
}

/// A point where the corridor crosses an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossingPoint {
    pub coordinate: LngLat,
    pub tag: ObstacleKind,
}

impl CrossingPoint {
    pub fn new(coordinate: LngLat, tag: ObstacleKind) -> Self {
        Self { coordinate, tag }
    }
}

/// Per-tag crossing counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrossingSummary {
    pub highway: usize,
    pub railway: usize,
}

impl CrossingSummary {
    /// Count crossings by tag.
    pub fn from_crossings(crossings: &[CrossingPoint]) -> Self {
        crossings.iter().fold(Self::default(), |mut acc, c| {
            match c.tag {
                ObstacleKind::Highway => acc.highway += 1,
                ObstacleKind::Railway => acc.railway += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.highway + self.railway
    }
}

impl fmt::Display for CrossingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} crossings ({} highway, {} railway)",
            self.total(),
            self.highway,
            self.railway
        )
    }
}

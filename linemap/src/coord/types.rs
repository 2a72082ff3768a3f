//! Coordinate type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Valid latitude range (WGS-84 degrees)
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Camera zoom range accepted by the rendering surface
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Maximum camera pitch in degrees
pub const MAX_PITCH: f64 = 60.0;

/// A geographic position in `[longitude, latitude]` order.
///
/// Serializes as a two-element JSON array, matching GeoJSON positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    /// Longitude in degrees, east positive
    pub lon: f64,
    /// Latitude in degrees, north positive
    pub lat: f64,
}

impl LngLat {
    /// Create a position without range validation.
    ///
    /// Planar geometry routines accept arbitrary coordinates, so this is the
    /// common constructor. Use [`LngLat::validated`] for user input.
    #[inline]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a position, rejecting out-of-range or non-finite values.
    pub fn validated(lon: f64, lat: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self { lon, lat })
    }

    /// Squared planar distance in degree units.
    #[inline]
    pub fn squared_distance(&self, other: &LngLat) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lon, value.lat]
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lon, self.lat)
    }
}

/// Axis-aligned bounding box in longitude/latitude space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLatBounds {
    /// South-west corner
    pub min: LngLat,
    /// North-east corner
    pub max: LngLat,
}

impl LngLatBounds {
    /// Bounds covering a single point.
    pub fn from_point(point: LngLat) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LngLat>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(first);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// Grow the bounds to include `point`.
    pub fn extend(&mut self, point: LngLat) {
        self.min.lon = self.min.lon.min(point.lon);
        self.min.lat = self.min.lat.min(point.lat);
        self.max.lon = self.max.lon.max(point.lon);
        self.max.lat = self.max.lat.max(point.lat);
    }

    /// Geometric center of the box.
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min.lon + self.max.lon) / 2.0,
            (self.min.lat + self.max.lat) / 2.0,
        )
    }

    /// True if `point` lies inside or on the edge of the box.
    pub fn contains(&self, point: &LngLat) -> bool {
        (self.min.lon..=self.max.lon).contains(&point.lon)
            && (self.min.lat..=self.max.lat).contains(&point.lat)
    }
}

/// Camera parameters of a rendering surface.
///
/// Zoom and pitch are clamped on construction; bearing is normalized to
/// `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Map center
    pub center: LngLat,
    /// Zoom level (0-22)
    pub zoom: f64,
    /// Tilt in degrees (0-60)
    pub pitch: f64,
    /// Rotation in degrees clockwise from north
    pub bearing: f64,
}

impl Camera {
    /// Create a top-down, north-up camera.
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pitch: 0.0,
            bearing: 0.0,
        }
    }

    /// Set the pitch, clamped to `[0, 60]` degrees.
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch.clamp(0.0, MAX_PITCH);
        self
    }

    /// Set the bearing, normalized to `[0, 360)` degrees.
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing.rem_euclid(360.0);
        self
    }

    /// Same camera looking at a different center and zoom.
    pub fn looking_at(mut self, center: LngLat, zoom: f64) -> Self {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }
}

/// Errors that can occur when validating coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-90 to 90)
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180 to 180)
    InvalidLongitude(f64),
    /// Text could not be parsed as a `lon,lat` pair
    InvalidPair(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidPair(text) => {
                write!(f, "Invalid coordinate pair: '{}' (expected 'lon,lat')", text)
            }
        }
    }
}

impl std::error::Error for CoordError {}

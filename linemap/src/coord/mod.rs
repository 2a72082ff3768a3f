//! Coordinate module
//!
//! Geographic positions in `[longitude, latitude]` order, bounding boxes,
//! camera parameters, and the spherical/Web Mercator math the map engine
//! needs (great-circle distance, camera framing of a bounding box).

mod types;

pub use types::{
    Camera, CoordError, LngLat, LngLatBounds, MAX_LAT, MAX_LON, MAX_PITCH, MAX_ZOOM, MIN_LAT,
    MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Mean Earth radius in kilometres used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Pixel size of the world at zoom 0 for vector map surfaces.
const WORLD_SIZE_PX: f64 = 512.0;

/// Degrees to radians conversion factor.
const DEG_TO_RAD: f64 = PI / 180.0;

/// Calculate the great-circle distance between two positions.
///
/// Uses the haversine formula with a spherical Earth of radius 6371 km:
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `d = 2R·atan2(√a, √(1−a))`.
///
/// # Example
///
/// ```
/// use linemap::coord::{haversine_km, LngLat};
///
/// // One degree of latitude is ~111 km
/// let d = haversine_km(LngLat::new(0.0, 0.0), LngLat::new(0.0, 1.0));
/// assert!((d - 111.19).abs() < 0.01);
/// ```
pub fn haversine_km(from: LngLat, to: LngLat) -> f64 {
    let d_lat = (to.lat - from.lat) * DEG_TO_RAD;
    let d_lon = (to.lon - from.lon) * DEG_TO_RAD;
    let lat1 = from.lat * DEG_TO_RAD;
    let lat2 = to.lat * DEG_TO_RAD;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Parse a `lon,lat` pair such as `"-46.63,-23.55"`.
pub fn parse_lng_lat(text: &str) -> Result<LngLat, CoordError> {
    let mut parts = text.split(',').map(str::trim);
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CoordError::InvalidPair(text.to_string()));
    };
    let lon: f64 = lon
        .parse()
        .map_err(|_| CoordError::InvalidPair(text.to_string()))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| CoordError::InvalidPair(text.to_string()))?;
    LngLat::validated(lon, lat)
}

/// Normalized Web Mercator X (0 at the antimeridian west, 1 east).
#[inline]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalized Web Mercator Y (0 at the north edge, 1 at the south edge).
#[inline]
fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-85.05112878, 85.05112878);
    let lat_rad = lat * DEG_TO_RAD;
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0
}

/// Inverse of [`mercator_y`].
#[inline]
fn mercator_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() / DEG_TO_RAD
}

/// Compute a camera that frames `bounds` inside a viewport.
///
/// Works in Web Mercator space: the zoom is the largest one at which the
/// projected box, plus `padding` pixels on every side, fits in `viewport`
/// (`width`, `height` in pixels). The result is capped at `max_zoom`; a
/// degenerate (single point) box gets `max_zoom` directly.
pub fn fit_bounds(
    bounds: &LngLatBounds,
    viewport: (f64, f64),
    padding: f64,
    max_zoom: f64,
) -> Camera {
    let x0 = mercator_x(bounds.min.lon);
    let x1 = mercator_x(bounds.max.lon);
    let y0 = mercator_y(bounds.max.lat);
    let y1 = mercator_y(bounds.min.lat);

    let center = LngLat::new(
        bounds.center().lon,
        mercator_lat((y0 + y1) / 2.0),
    );

    let avail_w = (viewport.0 - 2.0 * padding).max(1.0);
    let avail_h = (viewport.1 - 2.0 * padding).max(1.0);
    let span_x = (x1 - x0).abs();
    let span_y = (y1 - y0).abs();

    let zoom_for = |avail: f64, span: f64| {
        if span <= f64::EPSILON {
            f64::INFINITY
        } else {
            (avail / (WORLD_SIZE_PX * span)).log2()
        }
    };

    let zoom = zoom_for(avail_w, span_x)
        .min(zoom_for(avail_h, span_y))
        .min(max_zoom)
        .max(MIN_ZOOM);

    Camera::new(center, zoom)
}

#[cfg(test)]
mod tests;

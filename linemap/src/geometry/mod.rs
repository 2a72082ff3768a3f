//! Planar geometry for corridor crossing detection.
//!
//! Coordinates are treated as planar `(lon, lat)` pairs. At corridor scale
//! (tens of kilometres) the distortion is irrelevant for deciding *whether*
//! two polylines cross, which is all the crossing layer needs.
//!
//! # Degenerate input
//!
//! Segment pairs with a zero denominator (parallel, collinear or
//! zero-length) report no intersection. This includes collinear segments
//! that overlap along a stretch: an overlap is not reported as a crossing.
//!
//! # Complexity
//!
//! [`collect_intersections`] tests every corridor segment against every
//! obstacle segment, `O(n·m)`. Callers should bound input size rather than
//! expect a spatial index here.

mod crossing;

pub use crossing::{CrossingPoint, CrossingSummary, ObstacleKind};

use crate::coord::LngLat;

/// Tolerance on the intersection parameters so endpoints computed through
/// floating point still count as touching.
const PARAM_EPSILON: f64 = 1e-12;

/// Metres per degree of latitude on the 6371 km sphere.
const METERS_PER_DEGREE: f64 = 111_194.926_644_558_7;

/// A straight segment between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: LngLat,
    pub end: LngLat,
}

impl Segment {
    pub fn new(start: LngLat, end: LngLat) -> Self {
        Self { start, end }
    }
}

/// Intersection point of segments `a1-a2` and `b1-b2`, if any.
///
/// Solves `a1 + t·(a2 − a1) = b1 + u·(b2 − b1)` and accepts the point only
/// when both `t` and `u` lie in `[0, 1]`, so segments sharing an endpoint
/// report that endpoint. A zero denominator returns `None`.
///
/// The result is symmetric: swapping the two segments yields the same point.
///
/// # Example
///
/// ```
/// use linemap::coord::LngLat;
/// use linemap::geometry::intersect_segments;
///
/// let hit = intersect_segments(
///     LngLat::new(0.0, 0.0),
///     LngLat::new(2.0, 2.0),
///     LngLat::new(0.0, 2.0),
///     LngLat::new(2.0, 0.0),
/// );
/// assert_eq!(hit, Some(LngLat::new(1.0, 1.0)));
/// ```
pub fn intersect_segments(a1: LngLat, a2: LngLat, b1: LngLat, b2: LngLat) -> Option<LngLat> {
    let denom = (b2.lat - b1.lat) * (a2.lon - a1.lon) - (b2.lon - b1.lon) * (a2.lat - a1.lat);
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let t = ((b2.lon - b1.lon) * (a1.lat - b1.lat) - (b2.lat - b1.lat) * (a1.lon - b1.lon)) / denom;
    let u = ((a2.lon - a1.lon) * (a1.lat - b1.lat) - (a2.lat - a1.lat) * (a1.lon - b1.lon)) / denom;

    let in_range = |v: f64| (-PARAM_EPSILON..=1.0 + PARAM_EPSILON).contains(&v);
    if !in_range(t) || !in_range(u) {
        return None;
    }

    // Exact endpoint hits are returned verbatim so shared vertices do not
    // pick up rounding error.
    for endpoint in [a1, a2] {
        if endpoint == b1 || endpoint == b2 {
            return Some(endpoint);
        }
    }

    // Interpolate along the lexicographically smaller segment so the result
    // is bit-identical when the operands are swapped.
    let a_first = (a1.lon, a1.lat, a2.lon, a2.lat) <= (b1.lon, b1.lat, b2.lon, b2.lat);
    let (p1, p2, s) = if a_first { (a1, a2, t) } else { (b1, b2, u) };

    Some(LngLat::new(
        p1.lon + s * (p2.lon - p1.lon),
        p1.lat + s * (p2.lat - p1.lat),
    ))
}

/// Split a polyline into consecutive segments.
///
/// A polyline with fewer than two vertices has no segments.
pub fn decompose(polyline: &[LngLat]) -> Vec<Segment> {
    polyline
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect()
}

/// Every point where `corridor` crosses one of `obstacles`, tagged `tag`.
///
/// Each corridor segment is tested against each obstacle segment. A crossing
/// that lands exactly on a shared corridor vertex is reported once.
pub fn collect_intersections(
    corridor: &[LngLat],
    obstacles: &[Vec<LngLat>],
    tag: ObstacleKind,
) -> Vec<CrossingPoint> {
    let corridor_segments = decompose(corridor);
    let mut crossings: Vec<CrossingPoint> = Vec::new();

    for obstacle in obstacles {
        let obstacle_segments = decompose(obstacle);
        for a in &corridor_segments {
            for b in &obstacle_segments {
                if let Some(point) = intersect_segments(a.start, a.end, b.start, b.end) {
                    let duplicate = crossings
                        .iter()
                        .any(|c| c.tag == tag && c.coordinate == point);
                    if !duplicate {
                        crossings.push(CrossingPoint::new(point, tag));
                    }
                }
            }
        }
    }

    tracing::debug!(
        corridor_segments = corridor_segments.len(),
        obstacles = obstacles.len(),
        crossings = crossings.len(),
        tag = %tag,
        "Collected corridor intersections"
    );

    crossings
}

/// Squared planar distance (degree units) from `point` to the nearest
/// crossing, or `None` if there are no crossings.
pub fn nearest_squared_distance(point: LngLat, crossings: &[CrossingPoint]) -> Option<f64> {
    crossings
        .iter()
        .map(|c| point.squared_distance(&c.coordinate))
        .min_by(|a, b| a.total_cmp(b))
}

/// Distance in metres from `point` to segment `seg`.
///
/// Uses an equirectangular projection centred on `point`, accurate for the
/// short distances corridor buffers deal with.
pub fn point_segment_distance_m(point: LngLat, seg: &Segment) -> f64 {
    let cos_lat = point.lat.to_radians().cos();
    let project = |p: LngLat| {
        (
            (p.lon - point.lon) * cos_lat * METERS_PER_DEGREE,
            (p.lat - point.lat) * METERS_PER_DEGREE,
        )
    };
    let (ax, ay) = project(seg.start);
    let (bx, by) = project(seg.end);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (cx * cx + cy * cy).sqrt()
}

/// Indices of the `points` lying within `meters` of any of `lines`.
///
/// This is the corridor buffer query: which events sit inside the right of
/// way of a transmission line.
pub fn within_distance(points: &[LngLat], lines: &[Vec<LngLat>], meters: f64) -> Vec<usize> {
    let segments: Vec<Segment> = lines.iter().flat_map(|line| decompose(line)).collect();
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| {
            segments
                .iter()
                .any(|seg| point_segment_distance_m(**point, seg) <= meters)
        })
        .map(|(index, _)| index)
        .collect()
}

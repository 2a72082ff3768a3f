//! Tests for coordinate math

use super::*;

fn haversine_reference(a: LngLat, b: LngLat) -> f64 {
    let to_rad = |d: f64| d * std::f64::consts::PI / 180.0;
    let d_lat = to_rad(b.lat - a.lat);
    let d_lon = to_rad(b.lon - a.lon);
    let h = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * to_rad(a.lat).cos() * to_rad(b.lat).cos();
    6371.0 * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

#[test]
fn test_haversine_zero_distance() {
    let p = LngLat::new(-46.633, -23.55);
    assert_eq!(haversine_km(p, p), 0.0);
}

#[test]
fn test_haversine_one_degree_latitude() {
    let d = haversine_km(LngLat::new(0.0, 0.0), LngLat::new(0.0, 1.0));
    // 2πR / 360
    assert!((d - 111.194_926_6).abs() < 1e-6, "got {}", d);
}

#[test]
fn test_haversine_is_symmetric() {
    let a = LngLat::new(-46.333, -23.96);
    let b = LngLat::new(-51.23, -30.03);
    assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
}

#[test]
fn test_haversine_matches_reference_formula() {
    let a = LngLat::new(-57.08, -29.75);
    let b = LngLat::new(-51.18, -29.16);
    assert!((haversine_km(a, b) - haversine_reference(a, b)).abs() < 1e-9);
}

#[test]
fn test_sao_paulo_to_rio() {
    let sp = LngLat::new(-46.6333, -23.5505);
    let rio = LngLat::new(-43.1729, -22.9068);
    let d = haversine_km(sp, rio);
    assert!(d > 355.0 && d < 365.0, "São Paulo to Rio should be ~360km, got {}", d);
}

#[test]
fn test_validated_rejects_out_of_range() {
    assert!(matches!(
        LngLat::validated(0.0, 91.0),
        Err(CoordError::InvalidLatitude(_))
    ));
    assert!(matches!(
        LngLat::validated(181.0, 0.0),
        Err(CoordError::InvalidLongitude(_))
    ));
    assert!(matches!(
        LngLat::validated(f64::NAN, 0.0),
        Err(CoordError::InvalidLongitude(_))
    ));
    assert!(LngLat::validated(-46.6, -23.5).is_ok());
}

#[test]
fn test_lnglat_serializes_as_array() {
    let p = LngLat::new(-46.5, -23.25);
    let json = serde_json::to_string(&p).unwrap();
    assert_eq!(json, "[-46.5,-23.25]");

    let back: LngLat = serde_json::from_str("[10.0, 20.0]").unwrap();
    assert_eq!(back, LngLat::new(10.0, 20.0));
}

#[test]
fn test_parse_lng_lat() {
    assert_eq!(
        parse_lng_lat("-46.63, -23.55").unwrap(),
        LngLat::new(-46.63, -23.55)
    );
    assert!(matches!(
        parse_lng_lat("12.0"),
        Err(CoordError::InvalidPair(_))
    ));
    assert!(matches!(
        parse_lng_lat("1,2,3"),
        Err(CoordError::InvalidPair(_))
    ));
    assert!(matches!(
        parse_lng_lat("abc,2"),
        Err(CoordError::InvalidPair(_))
    ));
    assert!(matches!(
        parse_lng_lat("0,95"),
        Err(CoordError::InvalidLatitude(_))
    ));
}

#[test]
fn test_bounds_from_points() {
    let bounds = LngLatBounds::from_points(vec![
        LngLat::new(-50.0, -30.0),
        LngLat::new(-45.0, -20.0),
        LngLat::new(-48.0, -25.0),
    ])
    .unwrap();
    assert_eq!(bounds.min, LngLat::new(-50.0, -30.0));
    assert_eq!(bounds.max, LngLat::new(-45.0, -20.0));
    assert_eq!(bounds.center(), LngLat::new(-47.5, -25.0));
    assert!(bounds.contains(&LngLat::new(-48.0, -25.0)));
    assert!(!bounds.contains(&LngLat::new(-44.0, -25.0)));
}

#[test]
fn test_bounds_from_empty_is_none() {
    assert!(LngLatBounds::from_points(Vec::new()).is_none());
}

#[test]
fn test_camera_clamps() {
    let camera = Camera::new(LngLat::new(0.0, 0.0), 30.0)
        .with_pitch(75.0)
        .with_bearing(-17.0);
    assert_eq!(camera.zoom, MAX_ZOOM);
    assert_eq!(camera.pitch, MAX_PITCH);
    assert!((camera.bearing - 343.0).abs() < 1e-9);
}

#[test]
fn test_fit_bounds_single_point_uses_max_zoom() {
    let p = LngLat::new(-46.6, -23.5);
    let camera = fit_bounds(&LngLatBounds::from_point(p), (800.0, 600.0), 40.0, 11.0);
    assert_eq!(camera.zoom, 11.0);
    assert!((camera.center.lon - p.lon).abs() < 1e-9);
    assert!((camera.center.lat - p.lat).abs() < 1e-9);
}

#[test]
fn test_fit_bounds_wider_box_zooms_out() {
    let small = LngLatBounds::from_points(vec![LngLat::new(-47.0, -24.0), LngLat::new(-46.0, -23.0)])
        .unwrap();
    let large = LngLatBounds::from_points(vec![LngLat::new(-57.0, -33.0), LngLat::new(-45.0, -20.0)])
        .unwrap();
    let z_small = fit_bounds(&small, (800.0, 600.0), 40.0, 18.0).zoom;
    let z_large = fit_bounds(&large, (800.0, 600.0), 40.0, 18.0).zoom;
    assert!(z_small > z_large);
    assert!(z_large > 0.0);
}

#[test]
fn test_fit_bounds_whole_world_width() {
    let bounds =
        LngLatBounds::from_points(vec![LngLat::new(-180.0, 0.0), LngLat::new(180.0, 0.0)]).unwrap();
    // 512px world at zoom 0 fits in a 512px viewport exactly
    let camera = fit_bounds(&bounds, (512.0, 512.0), 0.0, 22.0);
    assert!(camera.zoom.abs() < 1e-9);
}

//! Geographic primitives and coordinate transformations.
//!
//! This module provides the pure geometry the rest of the engine builds
//! on: coordinate normalization, great-circle helpers, map projections,
//! and geographic bounding rectangles.

mod bounds;
mod projection;

pub use bounds::GeoBounds;
pub use projection::Projection;

use geo_types::Coord;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wraps a longitude into the canonical (-180, 180] interval.
///
/// Non-finite input is returned unchanged; the caller decides whether
/// to drop the value.
pub fn normalize_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return lon;
    }
    180.0 - (180.0 - lon).rem_euclid(360.0)
}

/// Clamps a latitude into [-90, 90].
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Great-circle distance between two geographic coordinates in km.
///
/// Coordinates follow the crate convention `x` = longitude, `y` = latitude.
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial great-circle bearing from `from` to `to`, in degrees [0, 360).
pub fn bearing(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let d_lon = (to.x - from.x).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longitude_wraps_into_half_open_interval() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-180.0), 180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(540.0), 180.0);
    }

    #[test]
    fn latitude_clamps_to_poles() {
        assert_eq!(clamp_latitude(91.0), 90.0);
        assert_eq!(clamp_latitude(-123.0), -90.0);
        assert_eq!(clamp_latitude(45.5), 45.5);
    }

    #[test]
    fn haversine_equator_quarter() {
        // A quarter of the equator is a quarter of the circumference.
        let d = haversine_distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 90.0, y: 0.0 });
        let quarter = std::f64::consts::PI * EARTH_RADIUS_KM / 2.0;
        assert!((d - quarter).abs() < 1.0);
    }

    #[test]
    fn bearing_due_north_and_east() {
        let origin = Coord { x: 0.0, y: 0.0 };
        let north = bearing(origin, Coord { x: 0.0, y: 10.0 });
        let east = bearing(origin, Coord { x: 10.0, y: 0.0 });
        assert!(north.abs() < 1e-9);
        assert!((east - 90.0).abs() < 1e-9);
    }
}

//! Map projections.
//!
//! Each projection maps (latitude, longitude) in degrees to an
//! intermediate planar coordinate, still in degree-scaled units. The
//! viewport is responsible for scaling planar space to screen pixels;
//! nothing here knows about pixels.

use geo_types::Coord;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{clamp_latitude, normalize_longitude};

/// Latitude at which the Mercator y-term is clamped to dodge the pole
/// asymptote.
const MERCATOR_LAT_LIMIT: f64 = 85.0;

/// Supported map projections.
///
/// The set is closed and changes rarely; projection-dependent behavior
/// dispatches through `project`/`unproject` rather than trait objects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Mercator,
    Equirectangular,
    OrthographicNorthPole,
    OrthographicSouthPole,
    Robinson,
}

impl Projection {
    /// Display label for the projection.
    pub fn label(&self) -> &'static str {
        match self {
            Projection::Mercator => "Mercator",
            Projection::Equirectangular => "Equirectangular",
            Projection::OrthographicNorthPole => "Orthographic (North Pole)",
            Projection::OrthographicSouthPole => "Orthographic (South Pole)",
            Projection::Robinson => "Robinson",
        }
    }

    pub fn all() -> &'static [Projection] {
        &[
            Projection::Mercator,
            Projection::Equirectangular,
            Projection::OrthographicNorthPole,
            Projection::OrthographicSouthPole,
            Projection::Robinson,
        ]
    }

    /// Projects a geographic coordinate into planar space.
    ///
    /// Returns `None` for input the projection cannot represent: a
    /// non-finite coordinate, or a point on the far hemisphere of an
    /// orthographic view. Callers skip such points entirely; a single
    /// unrepresentable record never aborts a batch.
    pub fn project(&self, lat: f64, lon: f64) -> Option<DVec2> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }

        match self {
            Projection::Mercator => {
                // Latitudes past the pole limit collapse onto it, so the
                // asymptote is never evaluated and the inverse still
                // round-trips exactly on [-85, 85].
                let lat_rad = lat
                    .clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT)
                    .to_radians();
                let y = (std::f64::consts::FRAC_PI_4 + lat_rad / 2.0)
                    .tan()
                    .ln()
                    .to_degrees();
                Some(DVec2::new(lon, y))
            }
            Projection::Equirectangular => Some(DVec2::new(lon, lat)),
            Projection::OrthographicNorthPole => orthographic(lat, lon, true),
            Projection::OrthographicSouthPole => orthographic(lat, lon, false),
            Projection::Robinson => {
                let lat_rad = lat.to_radians();
                Some(DVec2::new(lon * (0.6 * lat_rad).cos(), 1.3 * lat))
            }
        }
    }

    /// Inverts a planar coordinate back to geographic (`x` = lon, `y` = lat).
    ///
    /// Mercator and Equirectangular invert exactly (round-trip within
    /// 1e-6 degrees away from the pole clamp). The orthographic and
    /// Robinson inverses mirror the simplified forward formulas and are
    /// approximate by design; they are used for screen-to-geo
    /// interaction, never for marker layout.
    pub fn unproject(&self, p: DVec2) -> Coord<f64> {
        let coord = match self {
            Projection::Mercator => {
                let lat = (2.0 * (p.y.to_radians()).exp().atan() - std::f64::consts::FRAC_PI_2)
                    .to_degrees();
                Coord { x: p.x, y: lat }
            }
            Projection::Equirectangular => Coord { x: p.x, y: p.y },
            Projection::OrthographicNorthPole => inverse_orthographic(p, true),
            Projection::OrthographicSouthPole => inverse_orthographic(p, false),
            Projection::Robinson => {
                let lat = p.y / 1.3;
                let lon = p.x / (0.6 * lat.to_radians()).cos();
                Coord { x: lon, y: lat }
            }
        };

        Coord {
            x: normalize_longitude(coord.x),
            y: clamp_latitude(coord.y),
        }
    }
}

/// Pole-centered orthographic projection, scaled to degree units.
///
/// Only the hemisphere around the chosen pole is representable; for a
/// pole-centered view the visibility test reduces to the sign of the
/// latitude (the equator is the limb and stays visible).
fn orthographic(lat: f64, lon: f64, north_pole: bool) -> Option<DVec2> {
    let visible = if north_pole { lat >= 0.0 } else { lat <= 0.0 };
    if !visible {
        return None;
    }

    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();
    let center_lat = if north_pole { 90.0_f64 } else { -90.0_f64 }.to_radians();

    let x = lat_rad.cos() * lon_rad.sin();
    let y = center_lat.cos() * lat_rad.sin() - center_lat.sin() * lat_rad.cos() * lon_rad.cos();

    Some(DVec2::new(x * 180.0, y * 180.0))
}

fn inverse_orthographic(p: DVec2, north_pole: bool) -> Coord<f64> {
    let x = p.x / 180.0;
    let y = p.y / 180.0;

    // rho is cos(lat) for a pole-centered view; the clamp pulls points
    // past the limb back onto it.
    let rho = (x * x + y * y).sqrt().min(1.0);
    let lat = if north_pole {
        rho.acos().to_degrees()
    } else {
        -rho.acos().to_degrees()
    };

    let lon = if rho < 1e-12 {
        0.0
    } else if north_pole {
        x.atan2(-y).to_degrees()
    } else {
        x.atan2(y).to_degrees()
    };

    Coord { x: lon, y: lat }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trips(projection: Projection, lat: f64, lon: f64) -> bool {
        let p = projection.project(lat, lon).unwrap();
        let back = projection.unproject(p);
        (back.y - lat).abs() < 1e-6 && (back.x - lon).abs() < 1e-6
    }

    #[test]
    fn mercator_round_trip() {
        for lat in [-85.0, -60.0, -10.0, 0.0, 33.3, 71.2, 85.0] {
            for lon in [-179.9, -90.0, 0.0, 45.0, 120.5, 180.0] {
                assert!(
                    round_trips(Projection::Mercator, lat, lon),
                    "round trip failed at ({lat}, {lon})"
                );
            }
        }
    }

    #[test]
    fn equirectangular_round_trip() {
        for lat in [-89.0, -45.0, 0.0, 45.0, 89.0] {
            for lon in [-179.9, -1.0, 0.0, 90.0, 180.0] {
                assert!(round_trips(Projection::Equirectangular, lat, lon));
            }
        }
    }

    #[test]
    fn mercator_clamps_at_poles() {
        let limit = Projection::Mercator.project(85.0, 0.0).unwrap();
        let north = Projection::Mercator.project(90.0, 0.0).unwrap();
        let south = Projection::Mercator.project(-89.0, 0.0).unwrap();
        assert!(limit.y.is_finite());
        assert_eq!(north.y, limit.y);
        assert_eq!(south.y, -limit.y);
    }

    #[test]
    fn mercator_equator_is_identity() {
        let p = Projection::Mercator.project(0.0, 42.0).unwrap();
        assert_eq!(p.x, 42.0);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn orthographic_far_hemisphere_unrepresentable() {
        assert!(Projection::OrthographicNorthPole.project(-30.0, 10.0).is_none());
        assert!(Projection::OrthographicSouthPole.project(30.0, 10.0).is_none());
        // The equator is the limb, still representable from either pole.
        assert!(Projection::OrthographicNorthPole.project(0.0, 10.0).is_some());
    }

    #[test]
    fn orthographic_near_side_approximately_inverts() {
        let p = Projection::OrthographicNorthPole.project(45.0, 30.0).unwrap();
        let back = Projection::OrthographicNorthPole.unproject(p);
        assert!((back.y - 45.0).abs() < 1e-6);
        assert!((back.x - 30.0).abs() < 1e-6);
    }

    #[test]
    fn robinson_formula() {
        let p = Projection::Robinson.project(50.0, 100.0).unwrap();
        assert!((p.y - 65.0).abs() < 1e-12);
        assert!((p.x - 100.0 * (0.6 * 50.0_f64.to_radians()).cos()).abs() < 1e-12);
    }

    #[test]
    fn nan_input_is_rejected() {
        assert!(Projection::Mercator.project(f64::NAN, 0.0).is_none());
        assert!(Projection::Robinson.project(0.0, f64::INFINITY).is_none());
    }
}

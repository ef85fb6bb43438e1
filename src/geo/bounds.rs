//! Geographic bounding rectangles.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use super::clamp_latitude;

/// A geographic rectangle in degrees.
///
/// A view crossing the ±180° seam is represented by letting `max_lon`
/// run past 180 (conceptually `min_lon + span`), so the longitude
/// interval stays contiguous; `contains` tests the wrapped interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// The whole globe.
    pub const WORLD: GeoBounds = GeoBounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_lat < self.max_lat && self.min_lon < self.max_lon
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min_lon + self.max_lon) / 2.0,
            y: (self.min_lat + self.max_lat) / 2.0,
        }
    }

    /// Tests whether a geographic point lies inside the rectangle,
    /// accounting for a longitude interval wrapped past the seam.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if lat < self.min_lat || lat > self.max_lat {
            return false;
        }
        if lon >= self.min_lon && lon <= self.max_lon {
            return true;
        }
        // Wrapped interval: a point just east of the seam appears at
        // lon + 360 on the unwrapped axis.
        self.max_lon > 180.0 && lon + 360.0 >= self.min_lon && lon + 360.0 <= self.max_lon
    }

    /// Smallest rectangle around a set of points, padded by 10% on each
    /// axis so framed markers do not touch the viewport edge.
    ///
    /// Returns the whole world for an empty set.
    pub fn around(points: &[Coord<f64>]) -> GeoBounds {
        let Some(first) = points.first() else {
            return GeoBounds::WORLD;
        };

        let mut bounds = GeoBounds::new(first.y, first.y, first.x, first.x);
        for p in points.iter().skip(1) {
            bounds.min_lat = bounds.min_lat.min(p.y);
            bounds.max_lat = bounds.max_lat.max(p.y);
            bounds.min_lon = bounds.min_lon.min(p.x);
            bounds.max_lon = bounds.max_lon.max(p.x);
        }

        let lat_pad = bounds.height() * 0.1;
        let lon_pad = bounds.width() * 0.1;
        bounds.min_lat = clamp_latitude(bounds.min_lat - lat_pad);
        bounds.max_lat = clamp_latitude(bounds.max_lat + lat_pad);
        bounds.min_lon -= lon_pad;
        bounds.max_lon += lon_pad;

        bounds
    }
}

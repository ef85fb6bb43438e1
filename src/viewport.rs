//! The viewport: center, zoom, and pixel size, plus the mapping between
//! planar projection space and screen pixels.
//!
//! Screen convention: x grows rightward, y grows downward, so northern
//! latitudes map toward the top of the screen. All scaling happens in
//! planar projection space; anchored zooming is solved there too, which
//! keeps the geographic point under the cursor fixed for every
//! projection, not just the linear ones.

use geo_types::Coord;
use glam::DVec2;

use crate::geo::{clamp_latitude, normalize_longitude, GeoBounds, Projection};

/// Zoom clamp range.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 50.0;

/// Multiplicative step for `zoom_in`/`zoom_out`.
pub const ZOOM_STEP: f64 = 1.5;

/// Center/zoom changes below this threshold are no-ops. Prevents
/// feedback loops when external animation and user input both drive the
/// same state.
const EPSILON: f64 = 1e-6;

/// Current view of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Coord<f64>,
    zoom: f64,
    width: f64,
    height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        // Zero-sized until the shell reports its first resize; geometry
        // calls refuse to compute until then.
        Self {
            center: Coord { x: 0.0, y: 0.0 },
            zoom: 1.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        let mut vp = Self::default();
        vp.resize(width, height);
        vp
    }

    /// A viewport can only produce geometry with a real pixel area and
    /// a positive zoom.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.zoom > 0.0
    }

    pub fn center(&self) -> Coord<f64> {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Updates the pixel size. Returns whether anything changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return false;
        }
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Re-centers the view, clamping latitude and normalizing longitude.
    /// Changes below the epsilon threshold are ignored; returns whether
    /// the center actually moved.
    pub fn set_center(&mut self, lat: f64, lon: f64) -> bool {
        if !lat.is_finite() || !lon.is_finite() {
            return false;
        }
        let lat = clamp_latitude(lat);
        let lon = normalize_longitude(lon);
        if (self.center.y - lat).abs() <= EPSILON && (self.center.x - lon).abs() <= EPSILON {
            return false;
        }
        self.center = Coord { x: lon, y: lat };
        true
    }

    /// Sets the zoom, clamped to [MIN_ZOOM, MAX_ZOOM]. Same epsilon
    /// no-op contract as `set_center`.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (self.zoom - zoom).abs() <= EPSILON {
            return false;
        }
        self.zoom = zoom;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / ZOOM_STEP)
    }

    /// Zooms while keeping the geographic point under `anchor` (screen
    /// pixels) at the same screen position.
    ///
    /// The new center is solved in planar space:
    /// `center' = center + (cursor - center) * (1 - 1/zoom_factor)`.
    pub fn zoom_at(&mut self, anchor: DVec2, new_zoom: f64, projection: Projection) -> bool {
        if !self.is_valid() || !new_zoom.is_finite() {
            return false;
        }
        let old_zoom = self.zoom;
        let new_zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - old_zoom).abs() <= EPSILON {
            return false;
        }

        let Some(center) = projection.project(self.center.y, self.center.x) else {
            // Center unrepresentable (orthographic far side): plain zoom.
            return self.set_zoom(new_zoom);
        };
        let cursor = self.planar_of(anchor, center);

        let factor = new_zoom / old_zoom;
        let new_center = center + (cursor - center) * (1.0 - 1.0 / factor);
        let geo = projection.unproject(new_center);

        self.set_center(geo.y, geo.x);
        self.zoom = new_zoom;
        true
    }

    /// Pans the center by degree deltas (keyboard navigation).
    pub fn pan_by(&mut self, d_lat: f64, d_lon: f64) -> bool {
        self.set_center(self.center.y + d_lat, self.center.x + d_lon)
    }

    /// Degrees moved per keyboard pan step at the current zoom.
    pub fn pan_step(&self) -> f64 {
        10.0 / self.zoom
    }

    /// Maps a geographic coordinate to screen pixels.
    ///
    /// `None` when the viewport is invalid or the point (or the view
    /// center) is not representable in the projection.
    pub fn screen_of(&self, coord: Coord<f64>, projection: Projection) -> Option<DVec2> {
        if !self.is_valid() {
            return None;
        }
        let center = projection.project(self.center.y, self.center.x)?;
        let p = projection.project(coord.y, coord.x)?;

        let mut dx = p.x - center.x;
        // In projections whose planar x is a longitude, route markers
        // through the near side of the ±180° seam.
        if matches!(
            projection,
            Projection::Mercator | Projection::Equirectangular
        ) {
            if dx > 180.0 {
                dx -= 360.0;
            } else if dx < -180.0 {
                dx += 360.0;
            }
        }

        Some(DVec2::new(
            dx * self.zoom * self.width / 360.0 + self.width / 2.0,
            (center.y - p.y) * self.zoom * self.height / 180.0 + self.height / 2.0,
        ))
    }

    /// Maps a screen pixel back to a geographic coordinate, clamping
    /// latitude and normalizing longitude.
    pub fn geo_of(&self, screen: DVec2, projection: Projection) -> Option<Coord<f64>> {
        if !self.is_valid() {
            return None;
        }
        let center = projection.project(self.center.y, self.center.x)?;
        Some(projection.unproject(self.planar_of(screen, center)))
    }

    /// The geographic rectangle currently on screen.
    ///
    /// When the view crosses the ±180° seam the returned `max_lon` runs
    /// past 180 so the interval stays contiguous. Pole-centered
    /// orthographic views are radial, not rectangular; they report the
    /// whole representable hemisphere instead of corner-derived bounds.
    pub fn visible_bounds(&self, projection: Projection) -> Option<GeoBounds> {
        if !self.is_valid() {
            return None;
        }
        match projection {
            Projection::OrthographicNorthPole => {
                return Some(GeoBounds::new(0.0, 90.0, -180.0, 180.0));
            }
            Projection::OrthographicSouthPole => {
                return Some(GeoBounds::new(-90.0, 0.0, -180.0, 180.0));
            }
            _ => {}
        }

        let top_left = self.geo_of(DVec2::ZERO, projection)?;
        let bottom_right = self.geo_of(DVec2::new(self.width, self.height), projection)?;

        let (min_lon, max_lon) = if 360.0 / self.zoom >= 360.0 {
            // The whole longitude range fits on screen.
            (-180.0, 180.0)
        } else if top_left.x > bottom_right.x {
            (top_left.x, bottom_right.x + 360.0)
        } else {
            (top_left.x, bottom_right.x)
        };

        Some(GeoBounds::new(
            bottom_right.y.min(top_left.y),
            top_left.y.max(bottom_right.y),
            min_lon,
            max_lon,
        ))
    }

    /// Zoom that frames `bounds` with a 20% margin, clamped to the zoom
    /// range. Invalid bounds frame nothing and yield the current zoom.
    pub fn optimal_zoom(&self, bounds: &GeoBounds) -> f64 {
        if !bounds.is_valid() {
            return self.zoom;
        }
        let lat_zoom = 180.0 / bounds.height();
        let lon_zoom = 360.0 / bounds.width();
        (lat_zoom.min(lon_zoom) * 0.8).clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Centers and zooms the view to frame `bounds`.
    pub fn fit_bounds(&mut self, bounds: &GeoBounds) -> bool {
        if !bounds.is_valid() {
            return false;
        }
        let center = bounds.center();
        let zoom = self.optimal_zoom(bounds);
        let moved = self.set_center(center.y, center.x);
        let zoomed = self.set_zoom(zoom);
        moved || zoomed
    }

    /// Screen pixel to planar projection space, given the projected
    /// view center.
    fn planar_of(&self, screen: DVec2, center: DVec2) -> DVec2 {
        DVec2::new(
            center.x + (screen.x - self.width / 2.0) * 360.0 / (self.zoom * self.width),
            center.y - (screen.y - self.height / 2.0) * 180.0 / (self.zoom * self.height),
        )
    }
}

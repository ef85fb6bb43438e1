//! Derived per-event visual state.
//!
//! Visual markers are a cache recomputed wholesale from an immutable
//! record snapshot plus the viewport, filters, and settings. They are
//! never patched incrementally, so they cannot drift from their source
//! records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use geo_types::Coord;
use glam::DVec2;

use crate::data::EarthquakeRecord;
use crate::map::animation;
use crate::map::color::{record_color, Rgba};
use crate::state::{FilterState, MapSettings};
use crate::viewport::Viewport;

/// Base marker diameter in pixels for a magnitude-3 event.
pub const DEFAULT_MARKER_SIZE: f64 = 8.0;

/// On-screen state for one earthquake record. Parallel to the record
/// snapshot: marker `i` belongs to record `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMarker {
    /// Identifier of the backing record.
    pub id: String,
    /// Copied from the record for size ordering and LOD cutoffs.
    pub magnitude: f64,
    pub screen_pos: DVec2,
    /// On-screen diameter in pixels, already zoom-scaled.
    pub display_size: f64,
    pub color: Rgba,
    /// In the visible bounds, passes all filters, and representable in
    /// the active projection.
    pub visible: bool,
    pub selected: bool,
    pub highlighted: bool,
    /// Index into the engine's cluster list, if grouped.
    pub cluster: Option<usize>,
    /// Animation pulse phase in [0, 1].
    pub animation_phase: f64,
}

/// Magnitude-driven marker diameter before zoom scaling:
/// `clamp(8 * 2^((magnitude - 3) / 2), 3, 50)`.
pub fn base_size(magnitude: f64) -> f64 {
    if !magnitude.is_finite() {
        return 3.0;
    }
    (DEFAULT_MARKER_SIZE * 2.0_f64.powf((magnitude - 3.0) / 2.0)).clamp(3.0, 50.0)
}

/// Zoom scaling factor, sub-linear so markers do not balloon when
/// zooming in: `clamp(sqrt(zoom), 0.5, 3.0)`.
pub fn zoom_scale(zoom: f64) -> f64 {
    zoom.sqrt().clamp(0.5, 3.0)
}

/// Final on-screen diameter for a magnitude at a zoom level.
pub fn display_size(magnitude: f64, zoom: f64) -> f64 {
    base_size(magnitude) * zoom_scale(zoom)
}

/// Rebuilds the full marker set from a record snapshot. O(n); a record
/// the projection cannot place is marked invisible and skipped, never
/// propagated as a failure.
#[allow(clippy::too_many_arguments)]
pub(crate) fn rebuild(
    records: &[EarthquakeRecord],
    viewport: &Viewport,
    settings: &MapSettings,
    filters: &FilterState,
    selected: &HashSet<String>,
    highlighted: &HashSet<String>,
    now: DateTime<Utc>,
    frame: u64,
) -> Vec<VisualMarker> {
    let bounds = viewport.visible_bounds(settings.projection);

    records
        .iter()
        .map(|record| {
            let screen_pos = viewport.screen_of(
                Coord {
                    x: record.longitude,
                    y: record.latitude,
                },
                settings.projection,
            );

            let in_bounds = bounds
                .as_ref()
                .is_some_and(|b| b.contains(record.latitude, record.longitude));
            let visible = screen_pos.is_some() && in_bounds && filters.passes(record);

            let animation_phase = if settings.animation_enabled {
                animation::pulse_phase(frame, record.timestamp, now)
            } else {
                1.0
            };

            VisualMarker {
                id: record.id.clone(),
                magnitude: record.magnitude,
                screen_pos: screen_pos.unwrap_or(DVec2::ZERO),
                display_size: display_size(record.magnitude, viewport.zoom()),
                color: record_color(settings.color_scheme, record, now),
                visible,
                selected: selected.contains(&record.id),
                highlighted: highlighted.contains(&record.id),
                cluster: None,
                animation_phase,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, lat: f64, lon: f64, magnitude: f64) -> EarthquakeRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        EarthquakeRecord::new(id, lat, lon, magnitude, 10.0, ts, "test")
    }

    fn rebuild_simple(records: &[EarthquakeRecord]) -> Vec<VisualMarker> {
        let viewport = Viewport::new(800.0, 600.0);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        rebuild(
            records,
            &viewport,
            &MapSettings::default(),
            &FilterState::default(),
            &HashSet::new(),
            &HashSet::new(),
            now,
            0,
        )
    }

    #[test]
    fn size_formula_matches_contract() {
        // clamp(8 * 2^((9.5 - 3) / 2), 3, 50) = 50, clamped to max.
        assert_eq!(base_size(9.5), 50.0);
        assert_eq!(base_size(3.0), 8.0);
        // Tiny events clamp at the floor.
        assert_eq!(base_size(-2.0), 3.0);
        assert_eq!(base_size(f64::NAN), 3.0);
    }

    #[test]
    fn zoom_scaling_is_bounded() {
        assert_eq!(zoom_scale(0.1), 0.5);
        assert_eq!(zoom_scale(1.0), 1.0);
        assert_eq!(zoom_scale(4.0), 2.0);
        assert_eq!(zoom_scale(50.0), 3.0);
    }

    #[test]
    fn origin_record_lands_center_screen() {
        let markers = rebuild_simple(&[record("a", 0.0, 0.0, 5.0)]);
        assert!(markers[0].visible);
        assert!((markers[0].screen_pos - DVec2::new(400.0, 300.0)).length() < 1e-9);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let records = vec![
            record("a", 0.0, 0.0, 5.0),
            record("b", 10.0, 20.0, 3.2),
            record("c", -35.0, 150.0, 6.8),
        ];
        let first = rebuild_simple(&records);
        let second = rebuild_simple(&records);
        assert_eq!(first, second);
    }

    #[test]
    fn failed_filter_hides_marker() {
        let viewport = Viewport::new(800.0, 600.0);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        let mut filters = FilterState::default();
        filters.min_magnitude = Some(6.0);

        let markers = rebuild(
            &[record("a", 0.0, 0.0, 5.0)],
            &viewport,
            &MapSettings::default(),
            &filters,
            &HashSet::new(),
            &HashSet::new(),
            now,
            0,
        );
        assert!(!markers[0].visible);
    }

    #[test]
    fn unrepresentable_record_is_isolated() {
        let viewport = Viewport::new(800.0, 600.0);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
        let mut settings = MapSettings::default();
        settings.projection = crate::geo::Projection::OrthographicNorthPole;

        let markers = rebuild(
            &[record("south", -45.0, 0.0, 5.0), record("north", 45.0, 0.0, 5.0)],
            &viewport,
            &settings,
            &FilterState::default(),
            &HashSet::new(),
            &HashSet::new(),
            now,
            0,
        );
        assert!(!markers[0].visible);
        assert!(markers[1].visible);
    }
}

//! Record visibility filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::EarthquakeRecord;
use crate::geo::GeoBounds;

/// AND-composed visibility predicate over the record set.
///
/// An unset bound is unconstrained. A record failing any single
/// predicate is filtered out regardless of the others.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
    pub min_depth_km: Option<f64>,
    pub max_depth_km: Option<f64>,
    /// Inclusive origin-time window.
    pub time_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Explicit geographic filter rectangle, independent of the view.
    pub region: Option<GeoBounds>,
}

impl FilterState {
    pub fn passes(&self, record: &EarthquakeRecord) -> bool {
        if let Some(min) = self.min_magnitude {
            if !(record.magnitude >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_magnitude {
            if !(record.magnitude <= max) {
                return false;
            }
        }
        if let Some(min) = self.min_depth_km {
            if !(record.depth_km >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_depth_km {
            if !(record.depth_km <= max) {
                return false;
            }
        }
        if let Some((start, end)) = self.time_window {
            if record.timestamp < start || record.timestamp > end {
                return false;
            }
        }
        if let Some(region) = self.region {
            if !region.contains(record.latitude, record.longitude) {
                return false;
            }
        }
        true
    }

    /// Whether any predicate is active.
    pub fn is_active(&self) -> bool {
        *self != FilterState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> EarthquakeRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        EarthquakeRecord::new("ev", 10.0, 20.0, 5.0, 30.0, ts, "test")
    }

    #[test]
    fn unset_filters_pass_everything() {
        assert!(FilterState::default().passes(&record()));
        assert!(!FilterState::default().is_active());
    }

    #[test]
    fn each_failing_predicate_hides_the_record() {
        let r = record();

        let mut f = FilterState::default();
        f.min_magnitude = Some(6.0);
        assert!(!f.passes(&r));

        let mut f = FilterState::default();
        f.max_depth_km = Some(10.0);
        assert!(!f.passes(&r));

        let mut f = FilterState::default();
        f.time_window = Some((r.timestamp + chrono::Duration::hours(1), r.timestamp + chrono::Duration::hours(2)));
        assert!(!f.passes(&r));

        let mut f = FilterState::default();
        f.region = Some(GeoBounds::new(-10.0, 0.0, 0.0, 10.0));
        assert!(!f.passes(&r));
    }

    #[test]
    fn and_composition_requires_all_predicates() {
        let r = record();
        let mut f = FilterState::default();
        // Every predicate passes except depth.
        f.min_magnitude = Some(4.0);
        f.max_magnitude = Some(6.0);
        f.min_depth_km = Some(50.0);
        f.region = Some(GeoBounds::WORLD);
        assert!(!f.passes(&r));

        f.min_depth_km = Some(10.0);
        assert!(f.passes(&r));
    }

    #[test]
    fn nan_magnitude_fails_closed_bounds() {
        let mut r = record();
        r.magnitude = f64::NAN;
        let mut f = FilterState::default();
        f.min_magnitude = Some(0.0);
        assert!(!f.passes(&r));
    }
}

//! Earthquake event records as supplied by the ingestion layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{clamp_latitude, normalize_longitude};

/// PAGER-style alert level attached to significant events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Minor,
    Moderate,
    Major,
    Critical,
}

impl AlertLevel {
    /// Display label for the alert level.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Major => "Major",
            Self::Critical => "Critical",
        }
    }

    pub fn all() -> &'static [AlertLevel] {
        &[
            AlertLevel::Info,
            AlertLevel::Minor,
            AlertLevel::Moderate,
            AlertLevel::Major,
            AlertLevel::Critical,
        ]
    }
}

/// A single earthquake event.
///
/// Records are immutable once ingested; a later record with the same
/// identifier replaces the earlier one wholesale. Everything visual
/// about an event is derived elsewhere and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    /// Unique event identifier from the feed (e.g. "us7000abcd").
    pub id: String,
    /// Degrees, [-90, 90].
    pub latitude: f64,
    /// Degrees, (-180, 180].
    pub longitude: f64,
    pub magnitude: f64,
    /// Hypocenter depth in kilometers, >= 0.
    pub depth_km: f64,
    /// Origin time, UTC.
    pub timestamp: DateTime<Utc>,
    /// Free-text place description from the feed.
    pub place: String,
    /// Alert level, present only for significant events.
    pub alert: Option<AlertLevel>,
    /// Reporting network/data source label.
    pub source: String,
    /// Whether the feed flagged a tsunami risk.
    pub tsunami: bool,
}

impl EarthquakeRecord {
    pub fn new(
        id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        magnitude: f64,
        depth_km: f64,
        timestamp: DateTime<Utc>,
        place: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            magnitude,
            depth_km,
            timestamp,
            place: place.into(),
            alert: None,
            source: String::new(),
            tsunami: false,
        }
    }

    /// Pulls out-of-range fields back into their valid domains.
    ///
    /// Out-of-range latitude clamps, longitude normalizes into
    /// (-180, 180], and negative or NaN depth becomes 0 (shallow feeds
    /// occasionally report small negative depths). Returns `None` when
    /// a coordinate is not finite: such a record cannot be placed on
    /// the map at all and is dropped rather than poisoning the batch.
    pub fn sanitized(mut self) -> Option<Self> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return None;
        }
        self.latitude = clamp_latitude(self.latitude);
        self.longitude = normalize_longitude(self.longitude);
        if !(self.depth_km >= 0.0) {
            self.depth_km = 0.0;
        }
        Some(self)
    }

    /// Event age relative to `now`, in hours. Negative for timestamps
    /// in the future (clock skew between feed and client).
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_milliseconds() as f64 / 3_600_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(lat: f64, lon: f64) -> EarthquakeRecord {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        EarthquakeRecord::new("ev1", lat, lon, 5.0, 10.0, ts, "somewhere")
    }

    #[test]
    fn sanitize_clamps_and_normalizes() {
        let r = record(95.0, 270.0).sanitized().unwrap();
        assert_eq!(r.latitude, 90.0);
        assert_eq!(r.longitude, -90.0);
    }

    #[test]
    fn sanitize_rejects_nan_coordinates() {
        assert!(record(f64::NAN, 0.0).sanitized().is_none());
        assert!(record(0.0, f64::INFINITY).sanitized().is_none());
    }

    #[test]
    fn sanitize_zeroes_negative_depth() {
        let mut r = record(0.0, 0.0);
        r.depth_km = -1.2;
        assert_eq!(r.sanitized().unwrap().depth_km, 0.0);
    }

    #[test]
    fn age_is_hours_since_origin() {
        let r = record(0.0, 0.0);
        let now = r.timestamp + chrono::Duration::hours(3);
        assert!((r.age_hours(now) - 3.0).abs() < 1e-9);
    }
}

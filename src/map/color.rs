//! Marker color derivation.
//!
//! Pure functions from record attributes to colors; the active scheme
//! dispatches through `record_color`. Colors are plain sRGB values the
//! paint layer converts into whatever its framework wants.

use chrono::{DateTime, Utc};

use crate::data::{AlertLevel, EarthquakeRecord};
use crate::state::ColorScheme;

/// An 8-bit sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fallback for records the active scheme cannot classify.
    pub const UNKNOWN: Rgba = Rgba::rgb(128, 128, 128);
}

/// Color for the active scheme.
pub fn record_color(scheme: ColorScheme, record: &EarthquakeRecord, now: DateTime<Utc>) -> Rgba {
    match scheme {
        ColorScheme::Magnitude => magnitude_color(record.magnitude),
        ColorScheme::Depth => depth_color(record.depth_km),
        ColorScheme::Age => age_color(record.timestamp, now),
        ColorScheme::AlertLevel => alert_color(record.alert),
        ColorScheme::DataSource => source_color(&record.source),
    }
}

/// Magnitude buckets at one-point intervals, light green up to purple.
pub fn magnitude_color(magnitude: f64) -> Rgba {
    if magnitude < 1.0 {
        Rgba::rgb(200, 255, 200)
    } else if magnitude < 2.0 {
        Rgba::rgb(150, 255, 150)
    } else if magnitude < 3.0 {
        Rgba::rgb(100, 255, 100)
    } else if magnitude < 4.0 {
        Rgba::rgb(255, 255, 100)
    } else if magnitude < 5.0 {
        Rgba::rgb(255, 200, 100)
    } else if magnitude < 6.0 {
        Rgba::rgb(255, 150, 100)
    } else if magnitude < 7.0 {
        Rgba::rgb(255, 100, 100)
    } else if magnitude < 8.0 {
        Rgba::rgb(200, 50, 50)
    } else {
        Rgba::rgb(150, 0, 150)
    }
}

/// Shallow red fading to deep blue over 0-700 km, with a green bump at
/// mid depths.
pub fn depth_color(depth_km: f64) -> Rgba {
    let t = (depth_km / 700.0).clamp(0.0, 1.0);
    Rgba::rgb(
        (255.0 * (1.0 - t)) as u8,
        (128.0 * (1.0 - (t - 0.5).abs() * 2.0)) as u8,
        (255.0 * t) as u8,
    )
}

/// Age buckets: red for the last hour, cooling through orange, yellow
/// and green to blue after a week.
pub fn age_color(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Rgba {
    let age_hours = (now - timestamp).num_milliseconds() as f64 / 3_600_000.0;

    if age_hours < 1.0 {
        Rgba::rgb(255, 50, 50)
    } else if age_hours < 6.0 {
        Rgba::rgb(255, 150, 50)
    } else if age_hours < 24.0 {
        Rgba::rgb(255, 255, 50)
    } else if age_hours < 168.0 {
        Rgba::rgb(150, 255, 50)
    } else {
        Rgba::rgb(100, 100, 200)
    }
}

/// Fixed palette per alert level; gray when the feed sent none.
pub fn alert_color(alert: Option<AlertLevel>) -> Rgba {
    match alert {
        Some(AlertLevel::Info) => Rgba::rgb(100, 150, 255),
        Some(AlertLevel::Minor) => Rgba::rgb(100, 255, 100),
        Some(AlertLevel::Moderate) => Rgba::rgb(255, 255, 100),
        Some(AlertLevel::Major) => Rgba::rgb(255, 150, 50),
        Some(AlertLevel::Critical) => Rgba::rgb(255, 50, 50),
        None => Rgba::UNKNOWN,
    }
}

/// Stable hue per data-source label.
///
/// Uses FNV-1a rather than the std hasher so the hue assignment never
/// changes across runs or std releases.
pub fn source_color(source: &str) -> Rgba {
    if source.is_empty() {
        return Rgba::UNKNOWN;
    }

    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in source.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hsv((hash % 360) as f64, 200.0 / 255.0, 200.0 / 255.0)
}

/// HSV to sRGB, hue in degrees, s/v in [0, 1].
fn hsv(h: f64, s: f64, v: f64) -> Rgba {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgba::rgb(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn magnitude_buckets() {
        assert_eq!(magnitude_color(0.5), Rgba::rgb(200, 255, 200));
        assert_eq!(magnitude_color(4.5), Rgba::rgb(255, 200, 100));
        assert_eq!(magnitude_color(7.9), Rgba::rgb(200, 50, 50));
        assert_eq!(magnitude_color(9.5), Rgba::rgb(150, 0, 150));
    }

    #[test]
    fn depth_endpoints() {
        assert_eq!(depth_color(0.0), Rgba::rgb(255, 0, 0));
        assert_eq!(depth_color(700.0), Rgba::rgb(0, 0, 255));
        // Past the scale clamps to the deep end.
        assert_eq!(depth_color(900.0), depth_color(700.0));
        // Mid-scale carries the green bump.
        assert_eq!(depth_color(350.0).g, 128);
    }

    #[test]
    fn age_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let at = |hours: i64| now - chrono::Duration::hours(hours);

        assert_eq!(age_color(at(0), now), Rgba::rgb(255, 50, 50));
        assert_eq!(age_color(at(3), now), Rgba::rgb(255, 150, 50));
        assert_eq!(age_color(at(12), now), Rgba::rgb(255, 255, 50));
        assert_eq!(age_color(at(100), now), Rgba::rgb(150, 255, 50));
        assert_eq!(age_color(at(200), now), Rgba::rgb(100, 100, 200));
    }

    #[test]
    fn source_hue_is_stable() {
        assert_eq!(source_color("us"), source_color("us"));
        assert_eq!(source_color(""), Rgba::UNKNOWN);
    }
}

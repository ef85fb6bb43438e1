//! Map display settings.
//!
//! All of these are plain serializable scalars/enums so the external
//! settings layer can persist them without knowing anything about the
//! engine internals.

use serde::{Deserialize, Serialize};

use crate::geo::Projection;

/// How marker colors are derived.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Magnitude buckets, green through purple.
    #[default]
    Magnitude,
    /// Shallow red to deep blue over 0-700 km.
    Depth,
    /// Event age buckets at 1h/6h/24h/168h.
    Age,
    /// Fixed palette per alert level.
    AlertLevel,
    /// Stable hue per reporting network.
    DataSource,
}

impl ColorScheme {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Magnitude => "Magnitude",
            Self::Depth => "Depth",
            Self::Age => "Age",
            Self::AlertLevel => "Alert Level",
            Self::DataSource => "Data Source",
        }
    }

    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::Magnitude,
            ColorScheme::Depth,
            ColorScheme::Age,
            ColorScheme::AlertLevel,
            ColorScheme::DataSource,
        ]
    }
}

/// Marker glyph shape. The engine only records the choice; drawing is
/// the paint layer's problem.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Cross,
}

impl MarkerShape {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Circle => "Circles",
            Self::Square => "Squares",
            Self::Diamond => "Diamonds",
            Self::Cross => "Crosses",
        }
    }

    pub fn all() -> &'static [MarkerShape] {
        &[
            MarkerShape::Circle,
            MarkerShape::Square,
            MarkerShape::Diamond,
            MarkerShape::Cross,
        ]
    }
}

/// Animation envelope applied to recent-event markers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationStyle {
    Off,
    #[default]
    Pulse,
    Ripple,
    Fade,
    Grow,
    Shake,
}

impl AnimationStyle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Pulse => "Pulse",
            Self::Ripple => "Ripple",
            Self::Fade => "Fade",
            Self::Grow => "Grow",
            Self::Shake => "Shake",
        }
    }

    pub fn all() -> &'static [AnimationStyle] {
        &[
            AnimationStyle::Off,
            AnimationStyle::Pulse,
            AnimationStyle::Ripple,
            AnimationStyle::Fade,
            AnimationStyle::Grow,
            AnimationStyle::Shake,
        ]
    }
}

/// Active display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    pub projection: Projection,
    pub color_scheme: ColorScheme,
    pub marker_shape: MarkerShape,
    pub animation_style: AnimationStyle,
    pub animation_enabled: bool,
    /// Animation speed multiplier, clamped to [0.1, 5.0] when applied.
    pub animation_speed: f64,
    pub clustering_enabled: bool,
    /// Pixel distance under which visible markers merge into a cluster.
    pub cluster_distance_px: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            color_scheme: ColorScheme::default(),
            marker_shape: MarkerShape::default(),
            animation_style: AnimationStyle::default(),
            animation_enabled: true,
            animation_speed: 1.0,
            clustering_enabled: true,
            cluster_distance_px: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_json() {
        let mut settings = MapSettings::default();
        settings.projection = Projection::Robinson;
        settings.color_scheme = ColorScheme::Depth;
        settings.clustering_enabled = false;

        let json = serde_json::to_string(&settings).unwrap();
        let back: MapSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn enum_lists_cover_all_variants() {
        assert_eq!(ColorScheme::all().len(), 5);
        assert_eq!(MarkerShape::all().len(), 4);
        assert_eq!(AnimationStyle::all().len(), 6);
    }
}

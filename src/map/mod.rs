//! The visualization pipeline: marker derivation, clustering, spatial
//! queries, animation, and level-of-detail, tied together by the
//! `MapEngine` facade.

pub mod animation;
mod clustering;
mod color;
mod engine;
mod lod;
mod markers;

pub use clustering::Cluster;
pub use color::{
    age_color, alert_color, depth_color, magnitude_color, record_color, source_color, Rgba,
};
pub use engine::MapEngine;
pub use hit_test::{ScreenRect, HIT_TOLERANCE_PX};
pub use lod::LodTier;
pub use markers::{base_size, display_size, zoom_scale, VisualMarker, DEFAULT_MARKER_SIZE};

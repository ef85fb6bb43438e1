//! Geospatial visualization engine for a live earthquake map.
//!
//! Turns a set of geographic earthquake records into a zoomable,
//! pannable, clustered, animated set of screen markers, and answers
//! spatial queries against them (what is under this pixel, what is
//! inside this rectangle, what view frames these events).
//!
//! The engine is deliberately blind to everything around it: the
//! windowing shell, feed ingestion, notification rules, and settings
//! persistence are external collaborators talking to [`MapEngine`]
//! through plain data. Nothing here draws a pixel.
//!
//! ```
//! use chrono::Utc;
//! use glam::DVec2;
//! use quakemap_engine::{EarthquakeRecord, MapEngine};
//!
//! let mut engine = MapEngine::new(800.0, 600.0);
//! engine.upsert(EarthquakeRecord::new(
//!     "us7000abcd", 35.7, -117.5, 5.4, 8.0, Utc::now(), "Searles Valley, CA",
//! ));
//! engine.refresh(Utc::now()).unwrap();
//!
//! if let Some(id) = engine.find_nearest(DVec2::new(400.0, 300.0)) {
//!     println!("clicked {id}");
//! }
//! ```

pub mod data;
pub mod error;
pub mod geo;
pub mod map;
pub mod state;
pub mod viewport;

pub use data::{AlertLevel, EarthquakeRecord, EventCatalog};
pub use error::GeometryError;
pub use geo::{GeoBounds, Projection};
pub use map::{Cluster, LodTier, MapEngine, Rgba, ScreenRect, VisualMarker};
pub use state::{AnimationStyle, ColorScheme, FilterState, MapSettings, MarkerShape};
pub use viewport::Viewport;

//! Engine configuration state: display settings and record filters.
//!
//! These are the knobs the shell exposes in menus and dialogs; all of
//! them are plain serializable data with no behavior beyond the filter
//! predicate.

mod filters;
mod settings;

pub use filters::FilterState;
pub use settings::{AnimationStyle, ColorScheme, MapSettings, MarkerShape};

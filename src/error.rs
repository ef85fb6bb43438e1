//! Engine error types.

use thiserror::Error;

/// Failure to produce screen geometry.
///
/// Raised at the engine boundary while the viewport is in an invalid
/// state (zero pixel size or zero zoom) or the view center cannot be
/// represented in the active projection. Callers should treat it as
/// "nothing to draw yet" rather than a fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("no geometry available: {0}")]
    NoGeometry(&'static str),
}

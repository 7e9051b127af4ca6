//! Lumen math types.
//!
//! Double precision vector algebra (via glam's `DVec3`), rays, intervals and
//! axis-aligned bounding boxes shared by every other crate in the workspace.

// Re-export glam for convenience
pub use glam;

mod aabb;
mod interval;
mod ray;

pub use aabb::{Aabb, Axis};
pub use interval::Interval;
pub use ray::Ray;

/// A point, direction or RGB color. All three share one representation.
pub type Vec3 = glam::DVec3;

/// Linear RGB color (channels usually in 0-1, lights may exceed 1).
pub type Color = glam::DVec3;

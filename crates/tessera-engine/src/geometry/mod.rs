//! Geometry helpers used during submission.

mod cull;

pub use cull::{triangle_overlaps_view, CULL_EPSILON};

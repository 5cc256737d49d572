//! Camera collaborator boundary.
//!
//! The renderer only needs three things from a camera: which cameras are
//! active, each camera's visibility mask, and its view-projection matrix.
//! [`CameraSource`] captures that; [`CameraSet`] is a plain owned implementation.

mod mask;
mod set;
mod source;

pub use mask::CameraMask;
pub use set::{Camera, CameraSet, DEPTH_EXTENT};
pub use source::{CameraId, CameraSource, CameraView};

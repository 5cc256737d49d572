//! Tessera engine crate.
//!
//! A triangle-batching 2D renderer: callers submit textured, colored triangles
//! into solid, transparent and stencil batches; each frame the batches are
//! sorted, split into state runs and composited per camera in three phases
//! (stencil write, solid, transparent).
//!
//! The renderer core ([`render::TriRenderer`]) is GPU-agnostic and drives a
//! [`render::GpuBackend`]; [`render::WgpuTriResources`] is the wgpu backend and
//! [`window::Runtime`] the optional winit host.

pub mod batch;
pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod geometry;
pub mod logging;
pub mod render;
pub mod window;

mod error;

pub use error::RenderError;

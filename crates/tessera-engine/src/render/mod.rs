//! Triangle renderer.
//!
//! [`TriRenderer`] owns the per-frame batches and drives any [`GpuBackend`]
//! through the three-phase compositor. [`WgpuTriResources`] is the wgpu backend.
//!
//! Convention:
//! - submitted positions are in world units; each camera's view-projection maps
//!   them to NDC
//! - larger z is nearer; depth is cleared to the far plane per camera

mod backend;
mod compositor;
mod config;
mod ctx;
mod renderer;
mod shaders;
mod stats;
mod wgpu_backend;

#[cfg(any(test, feature = "mock"))]
pub mod recording;

pub use backend::GpuBackend;
pub use compositor::{BlendMode, DepthCompare, PassState, Phase, StencilMode, StencilOp};
pub use config::{BatchCapacities, RendererConfig};
pub use ctx::{RenderCtx, RenderTarget};
pub use renderer::{SubmitOutcome, TriRenderer};
pub use shaders::{ShaderSources, ShaderTable, ShaderType};
pub use stats::FrameStats;
pub use wgpu_backend::{initialize, WgpuFrame, WgpuTriResources};

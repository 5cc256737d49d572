use thiserror::Error;

use crate::batch::BatchKind;
use crate::camera::CameraId;
use crate::render::ShaderType;

/// Errors surfaced by the triangle renderer.
///
/// Capacity exhaustion and culling are not errors; see
/// [`SubmitOutcome`](crate::render::SubmitOutcome).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("invalid batch kind {0} (expected 0 = solid, 1 = transparent, 2 = stencil)")]
    InvalidBatchKind(i32),
    #[error("unknown camera {0:?}")]
    InvalidCamera(CameraId),
    #[error("stencil-batch triangles must name a stencil group in 0..=7")]
    MissingStencilGroup,
    #[error("invalid capacity {capacity} for the {kind} batch")]
    InvalidCapacity { kind: BatchKind, capacity: usize },
    #[error("combined batch capacity {total} exceeds {max}; per-triangle depth offsets would collapse")]
    TotalCapacityTooLarge { total: usize, max: usize },
    #[error("failed to compile the {shader:?} shader: {message}")]
    ShaderCompile { shader: ShaderType, message: String },
    #[error("unknown texture handle {0}")]
    UnknownTexture(u32),
}

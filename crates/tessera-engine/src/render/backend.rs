use crate::batch::{BatchKind, TextureHandle, Vertex};
use crate::camera::CameraView;

use super::compositor::{PassState, StencilMode};
use super::ShaderType;

/// GPU command sink driven by the compositor.
///
/// Calls arrive in this shape, once per frame:
///
/// ```text
/// upload_vertices(kind, ..)            for each non-empty batch
/// begin_camera(view)                   for each active camera
///     set_pass_state(..)               per phase
///         bind_shader / set_stencil / bind_texture / set_aux   on change only
///         draw_indexed(kind, indices)  per visible run
/// end_camera()
/// ```
///
/// `begin_camera` clears depth (to the far plane) and stencil (to zero) but not color.
/// Index values refer to the vertex array last uploaded for the same batch kind.
/// Implementations must not retain `indices` past the call without copying.
pub trait GpuBackend {
    fn upload_vertices(&mut self, batch: BatchKind, vertices: &[Vertex]);

    fn begin_camera(&mut self, camera: &CameraView);

    fn set_pass_state(&mut self, state: PassState);

    fn set_stencil(&mut self, mode: StencilMode);

    fn bind_shader(&mut self, shader: ShaderType);

    fn bind_texture(&mut self, texture: TextureHandle);

    fn set_aux(&mut self, value: f32);

    fn draw_indexed(&mut self, batch: BatchKind, indices: &[u32]);

    fn end_camera(&mut self);
}

use crate::render::RenderTarget;

/// One acquired surface frame, already cleared.
///
/// Short-lived: the surface cannot hand out another texture until this one is
/// submitted via [`Gpu::submit`](super::Gpu::submit).
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Borrows the encoder and color view as a render target.
    #[inline]
    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget::new(&mut self.encoder, &self.view)
    }
}

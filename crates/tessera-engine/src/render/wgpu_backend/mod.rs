//! wgpu implementation of [`GpuBackend`](super::GpuBackend).
//!
//! [`WgpuTriResources`] owns everything that lives across frames: shader table,
//! pipeline cache, per-batch vertex/index buffers, the draw-uniform ring, the
//! texture registry and the depth-stencil target. A [`WgpuFrame`] borrows it
//! for one `render()` call.

mod frame;
mod pipelines;
mod targets;
mod textures;

pub use frame::WgpuFrame;

use crate::batch::{BatchKind, TextureHandle, Vertex};
use crate::camera::CameraSource;
use crate::error::RenderError;

use super::{
    FrameStats, RenderCtx, RenderTarget, RendererConfig, ShaderSources, ShaderTable, TriRenderer,
};
use pipelines::{DrawUniform, PipelineCache};
use targets::{DepthStencilTarget, GrowableBuffer};
use textures::TextureRegistry;

/// GPU resources of the triangle renderer.
pub struct WgpuTriResources {
    sources: ShaderSources,
    shaders: ShaderTable,
    pipelines: PipelineCache,

    vertex_buffers: [GrowableBuffer; 3],
    index_buffers: [GrowableBuffer; 3],

    uniforms: GrowableBuffer,
    uniform_stride: u64,
    uniform_bind_group: Option<wgpu::BindGroup>,

    textures: TextureRegistry,
    depth: DepthStencilTarget,
}

impl WgpuTriResources {
    /// Compiles the shader table and allocates buffers sized for `config`.
    pub fn new(ctx: &RenderCtx<'_>, config: &RendererConfig, sources: ShaderSources) -> Result<Self, RenderError> {
        let shaders = ShaderTable::load(ctx.device, &sources)?;
        let pipelines = PipelineCache::new(ctx.device, ctx.surface_format);
        let textures = TextureRegistry::new(ctx.device, ctx.queue, &pipelines.texture_layout);

        let align = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = DrawUniform::SIZE.div_ceil(align) * align;

        let vertex_buffers = [
            GrowableBuffer::new("tessera solid vbo", wgpu::BufferUsages::VERTEX),
            GrowableBuffer::new("tessera transparent vbo", wgpu::BufferUsages::VERTEX),
            GrowableBuffer::new("tessera stencil vbo", wgpu::BufferUsages::VERTEX),
        ];
        let index_buffers = [
            GrowableBuffer::new("tessera solid ibo", wgpu::BufferUsages::INDEX),
            GrowableBuffer::new("tessera transparent ibo", wgpu::BufferUsages::INDEX),
            GrowableBuffer::new("tessera stencil ibo", wgpu::BufferUsages::INDEX),
        ];

        let mut res = Self {
            sources,
            shaders,
            pipelines,
            vertex_buffers,
            index_buffers,
            uniforms: GrowableBuffer::new("tessera draw uniforms", wgpu::BufferUsages::UNIFORM),
            uniform_stride,
            uniform_bind_group: None,
            textures,
            depth: DepthStencilTarget::new(),
        };

        for kind in BatchKind::ALL {
            let tris = config.capacities.get(kind) as u64;
            let vertex_bytes = tris * 3 * std::mem::size_of::<Vertex>() as u64;
            res.vertex_buffers[kind.index()].ensure(ctx.device, vertex_bytes);
            res.index_buffers[kind.index()].ensure(ctx.device, tris * 3 * 4);
        }
        res.uniforms.ensure(ctx.device, uniform_stride * 64);
        res.ensure_uniform_bind_group(ctx.device);
        res.depth.ensure(ctx.device, ctx.viewport.texel_size());

        Ok(res)
    }

    /// Starts a frame; pass it to [`TriRenderer::render`], then call [`WgpuFrame::finish`].
    pub fn begin_frame<'r, 'a>(&'r mut self, ctx: &'r RenderCtx<'a>) -> WgpuFrame<'r, 'a> {
        WgpuFrame::new(self, ctx)
    }

    /// Renders `renderer`'s current frame into `target` through every active camera.
    pub fn draw<C: CameraSource>(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        renderer: &mut TriRenderer,
        cameras: &C,
    ) -> Result<FrameStats, RenderError> {
        let mut frame = self.begin_frame(ctx);
        let stats = renderer.render(cameras, &mut frame)?;
        frame.finish(target);
        Ok(stats)
    }

    /// Recompiles every program from `sources`.
    ///
    /// On failure the previous table stays active and the error is returned.
    pub fn reload_shaders(&mut self, device: &wgpu::Device, sources: ShaderSources) -> Result<(), RenderError> {
        let shaders = ShaderTable::load(device, &sources)?;
        self.shaders = shaders;
        self.sources = sources;
        self.pipelines.invalidate();
        log::info!("triangle renderer shaders reloaded");
        Ok(())
    }

    /// Recompiles the current sources.
    pub fn recompile_shaders(&mut self, device: &wgpu::Device) -> Result<(), RenderError> {
        self.reload_shaders(device, self.sources.clone())
    }

    /// Resizes the depth-stencil target to a new render area.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        self.depth.ensure(device, size);
    }

    /// Current depth-stencil size in physical pixels.
    #[inline]
    pub fn target_size(&self) -> (u32, u32) {
        self.depth.size()
    }

    /// Makes `view` available to triangles via the returned handle.
    ///
    /// The view must be a filterable 2D float texture.
    pub fn register_texture(&mut self, device: &wgpu::Device, view: &wgpu::TextureView) -> TextureHandle {
        self.textures.register(device, &self.pipelines.texture_layout, view)
    }

    /// Points `handle` at a new view.
    ///
    /// # Errors
    /// [`RenderError::UnknownTexture`] for unregistered handles and for the
    /// built-in [`TextureHandle::WHITE`].
    pub fn replace_texture(
        &mut self,
        device: &wgpu::Device,
        handle: TextureHandle,
        view: &wgpu::TextureView,
    ) -> Result<(), RenderError> {
        if self.textures.replace(device, &self.pipelines.texture_layout, handle, view) {
            Ok(())
        } else {
            Err(RenderError::UnknownTexture(handle.0))
        }
    }

    /// Number of pipelines built so far.
    #[inline]
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    fn ensure_uniform_bind_group(&mut self, device: &wgpu::Device) {
        if self.uniform_bind_group.is_some() {
            return;
        }
        let Some(buffer) = self.uniforms.buffer() else { return };

        self.uniform_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera draw uniform bind group"),
            layout: &self.pipelines.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(DrawUniform::SIZE),
                }),
            }],
        }));
    }
}

/// Creates the renderer core and its GPU resources with the built-in shaders.
pub fn initialize(
    ctx: &RenderCtx<'_>,
    config: RendererConfig,
) -> Result<(TriRenderer, WgpuTriResources), RenderError> {
    let resources = WgpuTriResources::new(ctx, &config, ShaderSources::default())?;
    let renderer = TriRenderer::new(config)?;
    Ok((renderer, resources))
}

use crate::batch::{BatchKind, TextureHandle, Vertex};
use crate::camera::CameraView;
use crate::coords::Rect;
use crate::render::compositor::{PassState, StencilMode};
use crate::render::{GpuBackend, RenderCtx, RenderTarget, ShaderType};

use super::pipelines::{DrawUniform, PipelineKey, STENCIL_REFERENCE};
use super::WgpuTriResources;

/// One recorded draw, replayed into a render pass by [`WgpuFrame::finish`].
#[derive(Debug, Copy, Clone)]
struct DrawCmd {
    pipeline: PipelineKey,
    texture: TextureHandle,
    batch: BatchKind,
    first_index: u32,
    index_count: u32,
    uniform_offset: u32,
}

/// Draws of one camera, in submission order.
#[derive(Debug, Clone)]
struct CameraPass {
    /// Physical-pixel viewport `(x, y, w, h)`; `None` when the region is off-target.
    viewport: Option<(f32, f32, f32, f32)>,
    draws: Vec<DrawCmd>,
}

/// CPU-side draw recording for every camera of a frame.
///
/// Index data and draw uniforms are staged per frame so later cameras never
/// overwrite what an earlier camera's pass reads.
#[derive(Debug, Clone)]
struct FrameStaging {
    uniform_stride: usize,
    passes: Vec<CameraPass>,
    // Index data for every camera, per batch kind.
    indices: [Vec<u32>; 3],
    uniforms: Vec<u8>,
}

impl FrameStaging {
    fn new(uniform_stride: usize) -> Self {
        Self {
            uniform_stride,
            passes: Vec::new(),
            indices: [Vec::new(), Vec::new(), Vec::new()],
            uniforms: Vec::new(),
        }
    }

    fn begin_camera(&mut self, viewport: Option<(f32, f32, f32, f32)>) {
        self.passes.push(CameraPass { viewport, draws: Vec::new() });
    }

    /// Stages one draw into the open camera. Returns `false`, staging nothing,
    /// when no camera is open.
    fn record(
        &mut self,
        pipeline: PipelineKey,
        texture: TextureHandle,
        batch: BatchKind,
        uniform: &DrawUniform,
        indices: &[u32],
    ) -> bool {
        let Some(camera) = self.passes.last_mut() else { return false };

        let uniform_offset = self.uniforms.len() as u32;
        self.uniforms.extend_from_slice(bytemuck::bytes_of(uniform));
        self.uniforms.resize(uniform_offset as usize + self.uniform_stride, 0);

        let staging = &mut self.indices[batch.index()];
        let first_index = staging.len() as u32;
        staging.extend_from_slice(indices);

        camera.draws.push(DrawCmd {
            pipeline,
            texture,
            batch,
            first_index,
            index_count: indices.len() as u32,
            uniform_offset,
        });
        true
    }

    fn has_draws(&self) -> bool {
        self.passes.iter().any(|p| !p.draws.is_empty())
    }
}

/// [`GpuBackend`] for one wgpu frame.
///
/// Vertex uploads go straight to the queue. Draws are recorded on the CPU and
/// encoded into the target's command encoder by [`finish`](Self::finish), one
/// render pass per camera, so all cameras share a single submission.
pub struct WgpuFrame<'r, 'a> {
    res: &'r mut WgpuTriResources,
    ctx: &'r RenderCtx<'a>,

    staging: FrameStaging,

    pass: Option<PassState>,
    stencil: StencilMode,
    shader: ShaderType,
    texture: TextureHandle,
    aux: f32,
    view_proj: [[f32; 4]; 4],
}

impl<'r, 'a> WgpuFrame<'r, 'a> {
    pub(super) fn new(res: &'r mut WgpuTriResources, ctx: &'r RenderCtx<'a>) -> Self {
        res.pipelines.retarget(ctx.surface_format);
        let staging = FrameStaging::new(res.uniform_stride as usize);
        Self {
            res,
            ctx,
            staging,
            pass: None,
            stencil: StencilMode::Disabled,
            shader: ShaderType::Default,
            texture: TextureHandle::WHITE,
            aux: 0.0,
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    fn full_area(&self) -> Rect {
        Rect::from_viewport(self.ctx.viewport)
    }

    /// Uploads recorded indices and uniforms, then encodes one render pass per camera.
    pub fn finish(self, target: &mut RenderTarget<'_>) {
        let Self { res, ctx, staging, .. } = self;
        if !staging.has_draws() {
            return;
        }
        let FrameStaging { passes, indices, uniforms, .. } = staging;

        // Mutating methods must happen before borrowing buffers immutably.
        res.depth.ensure(ctx.device, ctx.viewport.texel_size());
        for kind in BatchKind::ALL {
            let data = &indices[kind.index()];
            if !data.is_empty() {
                res.index_buffers[kind.index()].write(ctx.device, ctx.queue, bytemuck::cast_slice(data));
            }
        }
        if res.uniforms.write(ctx.device, ctx.queue, &uniforms) {
            res.uniform_bind_group = None;
        }
        res.ensure_uniform_bind_group(ctx.device);

        let Some(depth_view) = res.depth.view() else { return };
        let Some(uniform_bg) = res.uniform_bind_group.as_ref() else { return };

        for pass in &passes {
            let Some((x, y, w, h)) = pass.viewport else { continue };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tessera camera pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
            rpass.set_stencil_reference(STENCIL_REFERENCE);

            for draw in &pass.draws {
                let Some(pipeline) = res.pipelines.get(&draw.pipeline) else { continue };
                let Some(vbo) = res.vertex_buffers[draw.batch.index()].buffer() else { continue };
                let Some(ibo) = res.index_buffers[draw.batch.index()].buffer() else { continue };

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, uniform_bg, &[draw.uniform_offset]);
                rpass.set_bind_group(1, res.textures.get(draw.texture), &[]);
                rpass.set_vertex_buffer(0, vbo.slice(..));
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(draw.first_index..draw.first_index + draw.index_count, 0, 0..1);
            }
        }
    }
}

impl GpuBackend for WgpuFrame<'_, '_> {
    fn upload_vertices(&mut self, batch: BatchKind, vertices: &[Vertex]) {
        self.res.vertex_buffers[batch.index()].write(
            self.ctx.device,
            self.ctx.queue,
            bytemuck::cast_slice(vertices),
        );
    }

    fn begin_camera(&mut self, camera: &CameraView) {
        let full = self.full_area();
        let region = match camera.region {
            Some(r) => r.intersect(full),
            None => Some(full),
        };

        self.view_proj = camera.view_projection.to_cols_array_2d();
        self.staging
            .begin_camera(region.map(|r| (r.origin.x, r.origin.y, r.size.x, r.size.y)));
    }

    fn set_pass_state(&mut self, state: PassState) {
        self.pass = Some(state);
    }

    fn set_stencil(&mut self, mode: StencilMode) {
        self.stencil = mode;
    }

    fn bind_shader(&mut self, shader: ShaderType) {
        self.shader = shader;
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.res.textures.note_missing(texture);
        self.texture = texture;
    }

    fn set_aux(&mut self, value: f32) {
        self.aux = value;
    }

    fn draw_indexed(&mut self, batch: BatchKind, indices: &[u32]) {
        let Some(pass) = self.pass else {
            log::warn!("draw issued before a pass state was set; skipped");
            return;
        };

        let key = PipelineKey {
            shader: self.shader,
            pass,
            stencil: self.stencil,
        };
        let uniform = DrawUniform {
            view_proj: self.view_proj,
            params: [self.aux, 0.0, 0.0, 0.0],
        };
        if !self.staging.record(key, self.texture, batch, &uniform, indices) {
            log::warn!("draw issued outside a camera; skipped");
            return;
        }

        self.res.pipelines.ensure(self.ctx.device, &self.res.shaders, key);
    }

    fn end_camera(&mut self) {}
}

#[cfg(test)]
mod tests {
    use crate::render::compositor::Phase;

    use super::*;

    const STRIDE: usize = 256;

    fn key() -> PipelineKey {
        PipelineKey {
            shader: ShaderType::Default,
            pass: Phase::Solid.pass_state(),
            stencil: StencilMode::Disabled,
        }
    }

    fn uniform(aux: f32) -> DrawUniform {
        DrawUniform {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            params: [aux, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn draw_without_camera_stages_nothing() {
        let mut staging = FrameStaging::new(STRIDE);

        let recorded = staging.record(key(), TextureHandle::WHITE, BatchKind::Solid, &uniform(0.0), &[0, 1, 2]);

        assert!(!recorded);
        assert!(staging.uniforms.is_empty());
        assert!(staging.indices.iter().all(Vec::is_empty));
        assert!(!staging.has_draws());
    }

    #[test]
    fn cameras_get_disjoint_index_and_uniform_ranges() {
        let mut staging = FrameStaging::new(STRIDE);

        staging.begin_camera(Some((0.0, 0.0, 8.0, 8.0)));
        assert!(staging.record(key(), TextureHandle::WHITE, BatchKind::Solid, &uniform(0.0), &[0, 1, 2]));
        staging.begin_camera(Some((4.0, 4.0, 4.0, 4.0)));
        assert!(staging.record(key(), TextureHandle::WHITE, BatchKind::Solid, &uniform(0.5), &[3, 4, 5]));

        assert_eq!(staging.indices[BatchKind::Solid.index()], vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(staging.uniforms.len(), 2 * STRIDE);

        let second = staging.passes[1].draws[0];
        assert_eq!(second.first_index, 3);
        assert_eq!(second.index_count, 3);
        assert_eq!(second.uniform_offset, STRIDE as u32);
    }
}

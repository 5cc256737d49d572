//! Recording backend for tests.
//!
//! [`RecordingBackend`] logs every [`GpuBackend`] call and can optionally
//! rasterize draws into a tiny CPU-side [`SoftTarget`] (color, depth and stencil),
//! so compositing behavior can be asserted on pixels without a GPU.

use glam::Vec3;

use crate::batch::{BatchKind, TextureHandle, Vertex};
use crate::camera::{CameraId, CameraView};
use crate::coords::{Rect, Vec2};

use super::backend::GpuBackend;
use super::compositor::{BlendMode, DepthCompare, PassState, StencilMode};
use super::ShaderType;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    UploadVertices { batch: BatchKind, count: usize },
    BeginCamera { id: CameraId },
    SetPassState(PassState),
    SetStencil(StencilMode),
    BindShader(ShaderType),
    BindTexture(TextureHandle),
    SetAux(f32),
    DrawIndexed { batch: BatchKind, indices: Vec<u32> },
    EndCamera,
}

/// CPU render target with one flat-shaded sample per pixel.
#[derive(Debug, Clone)]
pub struct SoftTarget {
    width: u32,
    height: u32,
    color: Vec<[f32; 4]>,
    depth: Vec<f32>,
    stencil: Vec<u8>,
}

impl SoftTarget {
    /// Opaque black target of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width * height) as usize;
        Self {
            width,
            height,
            color: vec![[0.0, 0.0, 0.0, 1.0]; n],
            depth: vec![1.0; n],
            stencil: vec![0; n],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.color[self.offset(x, y)]
    }

    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.offset(x, y)]
    }

    #[inline]
    pub fn stencil_at(&self, x: u32, y: u32) -> u8 {
        self.stencil[self.offset(x, y)]
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    fn clear_depth_stencil(&mut self) {
        self.depth.fill(1.0);
        self.stencil.fill(0);
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    fn draw_triangle(&mut self, verts: [&Vertex; 3], camera: &CameraView, pass: PassState, stencil: StencilMode) {
        let ndc = verts.map(|v| camera.view_projection.project_point3(Vec3::from_array(v.pos)));
        let depth = ndc[0].z;
        let src = verts[0].color;

        let full = self.bounds();
        let region = camera.region.unwrap_or(full);
        let Some(clip) = region.intersect(full) else {
            return;
        };

        let x0 = clip.origin.x.floor() as u32;
        let y0 = clip.origin.y.floor() as u32;
        let x1 = (clip.max().x.ceil() as u32).min(self.width);
        let y1 = (clip.max().y.ceil() as u32).min(self.height);

        for py in y0..y1 {
            for px in x0..x1 {
                let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                if !region.contains(center) {
                    continue;
                }

                // Pixel center in the camera's NDC (+Y up).
                let p = Vec2::new(
                    (center.x - region.origin.x) / region.size.x * 2.0 - 1.0,
                    1.0 - (center.y - region.origin.y) / region.size.y * 2.0,
                );
                if !inside(p, ndc[0].truncate().into(), ndc[1].truncate().into(), ndc[2].truncate().into()) {
                    continue;
                }

                let i = self.offset(px, py);
                if !stencil.passes(self.stencil[i]) {
                    continue;
                }
                let depth_ok = match pass.depth_compare {
                    DepthCompare::Always => true,
                    DepthCompare::Less => depth < self.depth[i],
                };
                if !depth_ok {
                    continue;
                }

                self.stencil[i] = stencil.apply(pass.stencil_op, self.stencil[i]);
                if pass.depth_write {
                    self.depth[i] = depth;
                }
                if pass.color_write {
                    self.color[i] = match pass.blend {
                        BlendMode::Opaque => src,
                        BlendMode::Alpha => blend(src, self.color[i]),
                    };
                }
            }
        }
    }
}

fn blend(src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let a = src[3];
    [
        src[0] * a + dst[0] * (1.0 - a),
        src[1] * a + dst[1] * (1.0 - a),
        src[2] * a + dst[2] * (1.0 - a),
        a + dst[3] * (1.0 - a),
    ]
}

/// Inclusive point-in-triangle test for either winding.
fn inside(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let edge = |u: Vec2, v: Vec2| (v - u).perp().dot(p - u);
    let (e0, e1, e2) = (edge(a, b), edge(b, c), edge(c, a));
    (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0)
}

/// [`GpuBackend`] that records calls instead of talking to a GPU.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    uploads: [Vec<Vertex>; 3],
    target: Option<SoftTarget>,

    camera: Option<CameraView>,
    pass: Option<PassState>,
    stencil: Option<StencilMode>,
}

impl RecordingBackend {
    /// Records calls only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls and rasterizes draws into a `width × height` target.
    pub fn with_target(width: u32, height: u32) -> Self {
        Self {
            target: Some(SoftTarget::new(width, height)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn target(&self) -> Option<&SoftTarget> {
        self.target.as_ref()
    }

    /// Vertices last uploaded for `kind`.
    pub fn uploaded(&self, kind: BatchKind) -> &[Vertex] {
        &self.uploads[kind.index()]
    }

    /// Recorded draws, in call order.
    pub fn draws(&self) -> impl Iterator<Item = (BatchKind, &[u32])> + '_ {
        self.calls.iter().filter_map(|c| match c {
            BackendCall::DrawIndexed { batch, indices } => Some((*batch, indices.as_slice())),
            _ => None,
        })
    }

    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    /// Number of draws issued between each `begin_camera` / `end_camera` pair.
    pub fn draws_per_camera(&self) -> Vec<(CameraId, usize)> {
        let mut out = Vec::new();
        for call in &self.calls {
            match call {
                BackendCall::BeginCamera { id } => out.push((*id, 0)),
                BackendCall::DrawIndexed { .. } => {
                    if let Some(last) = out.last_mut() {
                        last.1 += 1;
                    }
                }
                _ => {}
            }
        }
        out
    }
}

impl GpuBackend for RecordingBackend {
    fn upload_vertices(&mut self, batch: BatchKind, vertices: &[Vertex]) {
        let slot = &mut self.uploads[batch.index()];
        slot.clear();
        slot.extend_from_slice(vertices);
        self.calls.push(BackendCall::UploadVertices { batch, count: vertices.len() });
    }

    fn begin_camera(&mut self, camera: &CameraView) {
        if let Some(target) = &mut self.target {
            target.clear_depth_stencil();
        }
        self.camera = Some(*camera);
        self.calls.push(BackendCall::BeginCamera { id: camera.id });
    }

    fn set_pass_state(&mut self, state: PassState) {
        self.pass = Some(state);
        self.calls.push(BackendCall::SetPassState(state));
    }

    fn set_stencil(&mut self, mode: StencilMode) {
        self.stencil = Some(mode);
        self.calls.push(BackendCall::SetStencil(mode));
    }

    fn bind_shader(&mut self, shader: ShaderType) {
        self.calls.push(BackendCall::BindShader(shader));
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(BackendCall::BindTexture(texture));
    }

    fn set_aux(&mut self, value: f32) {
        self.calls.push(BackendCall::SetAux(value));
    }

    fn draw_indexed(&mut self, batch: BatchKind, indices: &[u32]) {
        self.calls.push(BackendCall::DrawIndexed { batch, indices: indices.to_vec() });

        let (Some(target), Some(camera), Some(pass)) = (&mut self.target, &self.camera, self.pass) else {
            return;
        };
        let stencil = self.stencil.unwrap_or(StencilMode::Disabled);
        let vertices = &self.uploads[batch.index()];

        for tri in indices.chunks_exact(3) {
            let verts = [
                &vertices[tri[0] as usize],
                &vertices[tri[1] as usize],
                &vertices[tri[2] as usize],
            ];
            target.draw_triangle(verts, camera, pass, stencil);
        }
    }

    fn end_camera(&mut self) {
        self.camera = None;
        self.calls.push(BackendCall::EndCamera);
    }
}

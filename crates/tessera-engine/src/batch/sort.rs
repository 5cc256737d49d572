use core::cmp::Ordering;

use crate::render::ShaderType;

use super::{StencilGroup, TextureHandle, Triangle};

/// Two aux values closer than this share a run.
pub const AUX_EPSILON: f32 = 1e-6;

/// Render-state order for solid and stencil batches:
/// shader, then texture, then stencil group (no group first).
#[inline]
pub(super) fn by_render_state(a: &Triangle, b: &Triangle) -> Ordering {
    a.shader
        .cmp(&b.shader)
        .then(a.texture.cmp(&b.texture))
        .then(a.stencil_group.cmp(&b.stencil_group))
}

/// Back-to-front order for the transparent batch.
#[inline]
pub(super) fn by_depth(a: &Triangle, b: &Triangle) -> Ordering {
    a.z.total_cmp(&b.z)
}

/// A maximal range of sorted triangles drawable with one GPU state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Run {
    /// Triangle range `start..end` in sorted order.
    pub start: usize,
    pub end: usize,
    pub shader: ShaderType,
    pub texture: TextureHandle,
    pub stencil_group: Option<StencilGroup>,
    pub aux: f32,
}

impl Run {
    fn open(start: usize, t: &Triangle) -> Self {
        Self {
            start,
            end: start + 1,
            shader: t.shader,
            texture: t.texture,
            stencil_group: t.stencil_group,
            aux: t.aux,
        }
    }

    #[inline]
    fn accepts(&self, t: &Triangle) -> bool {
        self.shader == t.shader
            && self.texture == t.texture
            && self.stencil_group == t.stencil_group
            && (self.aux - t.aux).abs() <= AUX_EPSILON
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Splits `triangles` into runs, appending them to `out`.
pub(super) fn detect_runs(triangles: &[Triangle], out: &mut Vec<Run>) {
    let mut current: Option<Run> = None;

    for (i, t) in triangles.iter().enumerate() {
        match current.as_mut() {
            Some(run) if run.accepts(t) => run.end = i + 1,
            _ => {
                if let Some(done) = current.take() {
                    out.push(done);
                }
                current = Some(Run::open(i, t));
            }
        }
    }

    if let Some(done) = current {
        out.push(done);
    }
}

//! Three-phase stencil compositor.
//!
//! Per camera, phases run in a fixed order:
//! 1. `StencilWrite`: stencil-batch triangles paint one bit-plane per clip group;
//!    color and depth are left untouched.
//! 2. `Solid`: opaque triangles, depth-tested, optionally masked by their group's bit.
//! 3. `Transparent`: alpha-blended triangles in back-to-front order, same masking.
//!
//! Each phase is described by a [`PassState`] plus a per-run [`StencilMode`];
//! backends translate those into concrete GPU state.

use crate::batch::{BatchKind, StencilGroup, TriangleBatch};
use crate::camera::CameraView;

use super::backend::GpuBackend;
use super::stats::FrameStats;

/// Depth comparison used by a phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DepthCompare {
    Always,
    Less,
}

/// Color blending used by a phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// Source replaces destination.
    Opaque,
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    Alpha,
}

/// Stencil operation applied when the stencil and depth tests pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StencilOp {
    Keep,
    Replace,
}

/// Fixed-function state for one phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PassState {
    pub color_write: bool,
    pub depth_write: bool,
    pub depth_compare: DepthCompare,
    pub blend: BlendMode,
    pub stencil_op: StencilOp,
}

/// Per-run stencil configuration.
///
/// The stencil reference is always `0xff`; masks select the group's bit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StencilMode {
    /// Test always passes; `mask` is the write mask (replace with `0xff & mask`).
    Write { mask: u8 },
    /// Pass only where `stencil & mask == mask`; nothing is written.
    Test { mask: u8 },
    /// Test always passes; nothing is written.
    Disabled,
}

impl StencilMode {
    /// Whether a pixel holding `stencil` passes this mode's test.
    #[inline]
    pub fn passes(self, stencil: u8) -> bool {
        match self {
            StencilMode::Test { mask } => stencil & mask == mask,
            StencilMode::Write { .. } | StencilMode::Disabled => true,
        }
    }

    /// Stencil value after a passing fragment under `op`.
    #[inline]
    pub fn apply(self, op: StencilOp, stencil: u8) -> u8 {
        match (self, op) {
            (StencilMode::Write { mask }, StencilOp::Replace) => (stencil & !mask) | (0xff & mask),
            _ => stencil,
        }
    }
}

/// One step of the per-camera compositing sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    StencilWrite,
    Solid,
    Transparent,
}

impl Phase {
    pub const ORDER: [Phase; 3] = [Phase::StencilWrite, Phase::Solid, Phase::Transparent];

    /// Batch drawn during this phase.
    #[inline]
    pub const fn batch(self) -> BatchKind {
        match self {
            Phase::StencilWrite => BatchKind::Stencil,
            Phase::Solid => BatchKind::Solid,
            Phase::Transparent => BatchKind::Transparent,
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn pass_state(self) -> PassState {
        match self {
            Phase::StencilWrite => PassState {
                color_write: false,
                depth_write: false,
                depth_compare: DepthCompare::Always,
                blend: BlendMode::Opaque,
                stencil_op: StencilOp::Replace,
            },
            Phase::Solid => PassState {
                color_write: true,
                depth_write: true,
                depth_compare: DepthCompare::Less,
                blend: BlendMode::Opaque,
                stencil_op: StencilOp::Keep,
            },
            Phase::Transparent => PassState {
                color_write: true,
                depth_write: true,
                depth_compare: DepthCompare::Less,
                blend: BlendMode::Alpha,
                stencil_op: StencilOp::Keep,
            },
        }
    }

    /// Stencil configuration for a run whose triangles carry `group`.
    pub fn stencil_mode(self, group: Option<StencilGroup>) -> StencilMode {
        match (self, group) {
            (Phase::StencilWrite, Some(g)) => StencilMode::Write { mask: g.bit() },
            // Rejected at submission; writes nothing if it ever gets here.
            (Phase::StencilWrite, None) => StencilMode::Write { mask: 0 },
            (_, Some(g)) => StencilMode::Test { mask: g.bit() },
            (_, None) => StencilMode::Disabled,
        }
    }
}

/// Runs the three phases for one camera.
///
/// Batches must already be prepared (sorted, runs detected, vertices uploaded).
/// Backend state is only touched when it changes between consecutive runs.
pub(crate) fn composite_camera<B: GpuBackend>(
    batches: &mut [TriangleBatch; 3],
    camera: &CameraView,
    backend: &mut B,
    stats: &mut FrameStats,
) {
    backend.begin_camera(camera);

    for phase in Phase::ORDER {
        let batch = &mut batches[phase.batch().index()];
        if batch.is_empty() {
            continue;
        }

        backend.set_pass_state(phase.pass_state());

        let kind = batch.kind();
        let mut bound_shader = None;
        let mut bound_stencil = None;
        let mut bound_texture = None;
        let mut bound_aux = None;

        batch.for_each_visible_run(camera.mask, |run, indices| {
            if bound_shader != Some(run.shader) {
                backend.bind_shader(run.shader);
                bound_shader = Some(run.shader);
                // Uniforms belong to the program; re-send after a switch.
                bound_aux = None;
            }

            let stencil = phase.stencil_mode(run.stencil_group);
            if bound_stencil != Some(stencil) {
                backend.set_stencil(stencil);
                bound_stencil = Some(stencil);
            }

            if bound_texture != Some(run.texture) {
                backend.bind_texture(run.texture);
                bound_texture = Some(run.texture);
            }

            if bound_aux != Some(run.aux) {
                backend.set_aux(run.aux);
                bound_aux = Some(run.aux);
            }

            backend.draw_indexed(kind, indices);
            stats.record_draw(phase, indices.len() / 3);
        });
    }

    backend.end_camera();
    stats.cameras += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── phase preconditions ───────────────────────────────────────────────

    #[test]
    fn stencil_write_touches_neither_color_nor_depth() {
        let s = Phase::StencilWrite.pass_state();
        assert!(!s.color_write);
        assert!(!s.depth_write);
        assert_eq!(s.depth_compare, DepthCompare::Always);
        assert_eq!(s.stencil_op, StencilOp::Replace);
    }

    #[test]
    fn solid_is_depth_tested_and_unblended() {
        let s = Phase::Solid.pass_state();
        assert!(s.color_write && s.depth_write);
        assert_eq!(s.depth_compare, DepthCompare::Less);
        assert_eq!(s.blend, BlendMode::Opaque);
        assert_eq!(s.stencil_op, StencilOp::Keep);
    }

    #[test]
    fn transparent_matches_solid_except_blending() {
        let solid = Phase::Solid.pass_state();
        let transparent = Phase::Transparent.pass_state();
        assert_eq!(transparent.blend, BlendMode::Alpha);
        assert_eq!(PassState { blend: BlendMode::Opaque, ..transparent }, solid);
    }

    #[test]
    fn phases_draw_stencil_then_solid_then_transparent() {
        let order: Vec<_> = Phase::ORDER.iter().map(|p| p.batch()).collect();
        assert_eq!(order, vec![BatchKind::Stencil, BatchKind::Solid, BatchKind::Transparent]);
    }

    // ── stencil modes ─────────────────────────────────────────────────────

    #[test]
    fn groups_map_to_single_bits() {
        let g3 = StencilGroup::new(3);
        assert_eq!(Phase::StencilWrite.stencil_mode(g3), StencilMode::Write { mask: 0b1000 });
        assert_eq!(Phase::Solid.stencil_mode(g3), StencilMode::Test { mask: 0b1000 });
        assert_eq!(Phase::Transparent.stencil_mode(None), StencilMode::Disabled);
    }

    #[test]
    fn write_sets_only_its_own_bit() {
        let w = StencilMode::Write { mask: 0b0100 };
        assert_eq!(w.apply(StencilOp::Replace, 0b0001), 0b0101);
        assert_eq!(w.apply(StencilOp::Keep, 0b0001), 0b0001);
    }

    #[test]
    fn test_mode_requires_its_bit() {
        let t = StencilMode::Test { mask: 0b0100 };
        assert!(t.passes(0b0110));
        assert!(!t.passes(0b0010));
        assert!(StencilMode::Disabled.passes(0));
    }
}

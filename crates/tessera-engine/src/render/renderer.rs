use crate::batch::{BatchKind, TriParams, TriVert, TriangleBatch};
use crate::camera::CameraSource;
use crate::coords::Vec2;
use crate::error::RenderError;
use crate::geometry::triangle_overlaps_view;

use super::backend::GpuBackend;
use super::compositor::composite_camera;
use super::config::{RendererConfig, MAX_TOTAL_CAPACITY};
use super::stats::FrameStats;

/// Result of a single triangle submission.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Stored for this frame.
    Accepted,
    /// Not visible to any active camera allowed by its mask; nothing stored.
    Culled,
    /// The target batch is at capacity; the triangle is dropped for this frame.
    Full,
}

impl SubmitOutcome {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == SubmitOutcome::Accepted
    }
}

/// Triangle-batching renderer core.
///
/// Owns the three per-frame batches. Rendering goes through a [`GpuBackend`], so
/// the same instance drives the wgpu backend in the application and a recording
/// backend in tests.
///
/// Frame protocol:
/// 1. `submit*()` any number of times
/// 2. `render()` once
/// 3. `clear_frame()` once
pub struct TriRenderer {
    batches: [TriangleBatch; 3],
    config: RendererConfig,

    /// Triangles accepted this frame across all batches.
    sequence: u32,
    /// Depth offset between consecutive submissions.
    z_step: f32,

    /// Batches that already logged a capacity warning this frame.
    warned_full: [bool; 3],
}

impl TriRenderer {
    /// Allocates the fixed-capacity batches.
    ///
    /// # Errors
    /// - [`RenderError::InvalidCapacity`] for a zero or oversized batch
    /// - [`RenderError::TotalCapacityTooLarge`] when the batches together exceed
    ///   [`MAX_TOTAL_CAPACITY`]
    pub fn new(config: RendererConfig) -> Result<Self, RenderError> {
        let caps = config.capacities;
        if caps.total() > MAX_TOTAL_CAPACITY {
            return Err(RenderError::TotalCapacityTooLarge {
                total: caps.total(),
                max: MAX_TOTAL_CAPACITY,
            });
        }

        let batches = [
            TriangleBatch::new(BatchKind::Solid, caps.solid)?,
            TriangleBatch::new(BatchKind::Transparent, caps.transparent)?,
            TriangleBatch::new(BatchKind::Stencil, caps.stencil)?,
        ];

        // One depth unit holds every triangle of a frame, with room to spare.
        let z_step = 1.0 / (2.0 * (caps.total() as f32 + 1.0));

        log::info!(
            "triangle renderer initialized (solid: {}, transparent: {}, stencil: {})",
            caps.solid,
            caps.transparent,
            caps.stencil
        );

        Ok(Self {
            batches,
            config,
            sequence: 0,
            z_step,
            warned_full: [false; 3],
        })
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn batch(&self, kind: BatchKind) -> &TriangleBatch {
        &self.batches[kind.index()]
    }

    /// Number of triangles stored in `kind` this frame.
    #[inline]
    pub fn len(&self, kind: BatchKind) -> usize {
        self.batch(kind).len()
    }

    /// `true` when no batch holds a triangle.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(TriangleBatch::is_empty)
    }

    /// Depth offset applied per accepted triangle.
    #[inline]
    pub fn z_step(&self) -> f32 {
        self.z_step
    }

    /// Culls and stores one triangle.
    ///
    /// The triangle is kept if any active camera whose flags intersect
    /// `params.camera_mask` sees it. Stored depth is
    /// `params.depth + z_step * (triangles accepted earlier this frame)`, so
    /// equal layers keep submission order.
    ///
    /// # Errors
    /// - [`RenderError::MissingStencilGroup`] for a stencil-batch triangle without a group
    /// - camera lookup errors from `cameras`
    pub fn submit<C: CameraSource>(
        &mut self,
        cameras: &C,
        verts: [TriVert; 3],
        params: &TriParams,
        kind: BatchKind,
    ) -> Result<SubmitOutcome, RenderError> {
        if kind == BatchKind::Stencil && params.stencil_group.is_none() {
            return Err(RenderError::MissingStencilGroup);
        }

        if !visible_to_any(cameras, &verts, params)? {
            return Ok(SubmitOutcome::Culled);
        }

        let z = params.depth as f32 + self.z_step * self.sequence as f32;
        let batch = &mut self.batches[kind.index()];

        if !batch.push(verts, params, z) {
            let slot = &mut self.warned_full[kind.index()];
            if !*slot {
                log::warn!(
                    "{kind} triangle batch full ({} triangles); dropping triangles this frame",
                    batch.capacity()
                );
                *slot = true;
            } else {
                log::trace!("{kind} triangle batch full; dropped {}", batch.dropped());
            }
            return Ok(SubmitOutcome::Full);
        }

        self.sequence += 1;
        Ok(SubmitOutcome::Accepted)
    }

    /// Array form of [`submit`](Self::submit).
    #[inline]
    pub fn submit_vertices<C: CameraSource>(
        &mut self,
        cameras: &C,
        verts: &[TriVert; 3],
        params: &TriParams,
        kind: BatchKind,
    ) -> Result<SubmitOutcome, RenderError> {
        self.submit(cameras, *verts, params, kind)
    }

    /// Submits a raw batch-kind id (0 = solid, 1 = transparent, 2 = stencil).
    ///
    /// # Errors
    /// [`RenderError::InvalidBatchKind`] for any other value.
    pub fn submit_raw<C: CameraSource>(
        &mut self,
        cameras: &C,
        verts: [TriVert; 3],
        params: &TriParams,
        kind: i32,
    ) -> Result<SubmitOutcome, RenderError> {
        let kind = BatchKind::try_from(kind)?;
        self.submit(cameras, verts, params, kind)
    }

    /// Submits the quad `v0 v1 v2 v3` (in winding order) as two triangles.
    ///
    /// Returns `Accepted` if either half was stored, `Full` if a half was dropped
    /// for capacity and none stored, `Culled` otherwise.
    pub fn submit_quad<C: CameraSource>(
        &mut self,
        cameras: &C,
        quad: [TriVert; 4],
        params: &TriParams,
        kind: BatchKind,
    ) -> Result<SubmitOutcome, RenderError> {
        let [v0, v1, v2, v3] = quad;
        let a = self.submit(cameras, [v0, v1, v2], params, kind)?;
        let b = self.submit(cameras, [v0, v2, v3], params, kind)?;

        Ok(match (a, b) {
            (SubmitOutcome::Accepted, _) | (_, SubmitOutcome::Accepted) => SubmitOutcome::Accepted,
            (SubmitOutcome::Full, _) | (_, SubmitOutcome::Full) => SubmitOutcome::Full,
            _ => SubmitOutcome::Culled,
        })
    }

    /// Sorts, uploads and draws the frame through every active camera.
    ///
    /// Does not clear the batches; call [`clear_frame`](Self::clear_frame) afterwards.
    pub fn render<C: CameraSource, B: GpuBackend>(
        &mut self,
        cameras: &C,
        backend: &mut B,
    ) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();

        for batch in &mut self.batches {
            let kind = batch.kind();
            stats.triangles_stored[kind.index()] = batch.len() as u32;
            stats.triangles_dropped[kind.index()] = batch.dropped();

            if batch.is_empty() {
                continue;
            }
            batch.prepare();
            backend.upload_vertices(kind, batch.vertices());
        }

        for id in cameras.active_cameras() {
            let view = cameras.view(id)?;
            composite_camera(&mut self.batches, &view, backend, &mut stats);
        }

        for batch in &mut self.batches {
            batch.mark_rendered();
        }

        log::debug!(
            "frame rendered: {} camera(s), draw calls stencil/solid/transparent = {:?}, dropped = {:?}",
            stats.cameras,
            stats.draw_calls,
            stats.triangles_dropped
        );

        Ok(stats)
    }

    /// Resets every batch to empty. GPU buffers are kept for the next frame.
    pub fn clear_frame(&mut self) {
        for batch in &mut self.batches {
            batch.clear();
        }
        self.sequence = 0;
        self.warned_full = [false; 3];
    }
}

/// Whether any camera allowed by `params.camera_mask` sees the triangle.
fn visible_to_any<C: CameraSource>(
    cameras: &C,
    verts: &[TriVert; 3],
    params: &TriParams,
) -> Result<bool, RenderError> {
    for id in cameras.active_cameras() {
        if !cameras.flags(id)?.intersects(params.camera_mask) {
            continue;
        }

        let vp = cameras.view_projection(id)?;
        let [p0, p1, p2] =
            verts.map(|v| Vec2::from(vp.project_point3(glam::Vec3::new(v.pos.x, v.pos.y, 0.0)).truncate()));

        if triangle_overlaps_view(p0, p1, p2) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use crate::batch::{StencilGroup, TextureHandle};
    use crate::camera::{Camera, CameraMask, CameraSet};
    use crate::coords::{Color, Rect};
    use crate::render::compositor::Phase;
    use crate::render::recording::RecordingBackend;
    use crate::render::{BatchCapacities, ShaderType};

    use super::*;

    const SIZE: u32 = 8;

    const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    fn screen() -> CameraSet {
        let mut cameras = CameraSet::new();
        cameras.add(Camera::orthographic(Rect::new(0.0, 0.0, SIZE as f32, SIZE as f32)));
        cameras
    }

    fn renderer() -> TriRenderer {
        TriRenderer::new(RendererConfig::default()).unwrap()
    }

    fn tri(x: f32, y: f32, s: f32, color: Color) -> [TriVert; 3] {
        [
            TriVert::solid(Vec2::new(x, y), color),
            TriVert::solid(Vec2::new(x + s, y), color),
            TriVert::solid(Vec2::new(x, y + s), color),
        ]
    }

    fn quad(r: Rect, color: Color) -> [TriVert; 4] {
        let max = r.max();
        [
            TriVert::solid(r.origin, color),
            TriVert::solid(Vec2::new(max.x, r.origin.y), color),
            TriVert::solid(max, color),
            TriVert::solid(Vec2::new(r.origin.x, max.y), color),
        ]
    }

    fn full_screen() -> Rect {
        Rect::new(0.0, 0.0, SIZE as f32, SIZE as f32)
    }

    // ── submission ────────────────────────────────────────────────────────

    #[test]
    fn triangle_beyond_one_side_is_culled() {
        let cameras = screen();
        let mut r = renderer();

        let out = r
            .submit(&cameras, tri(20.0, 1.0, 4.0, RED), &TriParams::default(), BatchKind::Solid)
            .unwrap();

        assert_eq!(out, SubmitOutcome::Culled);
        assert_eq!(r.len(BatchKind::Solid), 0);
    }

    #[test]
    fn triangle_enclosing_the_view_is_accepted() {
        let cameras = screen();
        let mut r = renderer();
        let verts = [
            TriVert::solid(Vec2::new(-100.0, -100.0), RED),
            TriVert::solid(Vec2::new(300.0, -100.0), RED),
            TriVert::solid(Vec2::new(-100.0, 300.0), RED),
        ];

        let out = r.submit(&cameras, verts, &TriParams::default(), BatchKind::Solid).unwrap();

        assert_eq!(out, SubmitOutcome::Accepted);
        assert_eq!(r.len(BatchKind::Solid), 1);
    }

    #[test]
    fn mask_without_matching_camera_is_culled() {
        let mut cameras = CameraSet::new();
        cameras.add(Camera::orthographic(full_screen()).with_mask(CameraMask::bit(0)));
        let mut r = renderer();
        let params = TriParams::default().with_camera_mask(CameraMask::bit(1));

        let out = r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &params, BatchKind::Solid).unwrap();

        assert_eq!(out, SubmitOutcome::Culled);
    }

    #[test]
    fn inactive_cameras_do_not_keep_triangles() {
        let mut cameras = screen();
        cameras.set_active(crate::camera::CameraId(0), false).unwrap();
        let mut r = renderer();

        let out = r
            .submit(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), BatchKind::Solid)
            .unwrap();

        assert_eq!(out, SubmitOutcome::Culled);
    }

    #[test]
    fn stencil_triangle_needs_a_group() {
        let cameras = screen();
        let mut r = renderer();

        let err = r
            .submit(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), BatchKind::Stencil)
            .unwrap_err();

        assert_eq!(err, RenderError::MissingStencilGroup);
        assert_eq!(r.len(BatchKind::Stencil), 0);
    }

    #[test]
    fn raw_batch_kind_out_of_range_is_rejected() {
        let cameras = screen();
        let mut r = renderer();

        let err = r
            .submit_raw(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), 7)
            .unwrap_err();

        assert_eq!(err, RenderError::InvalidBatchKind(7));
    }

    #[test]
    fn full_batch_drops_exactly_the_overflow() {
        let cameras = screen();
        let mut r = TriRenderer::new(RendererConfig {
            capacities: BatchCapacities { solid: 4, ..BatchCapacities::default() },
        })
        .unwrap();

        let outcomes: Vec<_> = (0..5)
            .map(|_| {
                r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), BatchKind::Solid)
                    .unwrap()
            })
            .collect();

        assert_eq!(outcomes.iter().filter(|o| o.is_accepted()).count(), 4);
        assert_eq!(outcomes[4], SubmitOutcome::Full);
        assert_eq!(r.len(BatchKind::Solid), 4);

        let stats = r.render(&cameras, &mut RecordingBackend::new()).unwrap();
        assert_eq!(stats.stored(BatchKind::Solid), 4);
        assert_eq!(stats.dropped(BatchKind::Solid), 1);
    }

    #[test]
    fn quad_submits_two_triangles() {
        let cameras = screen();
        let mut r = renderer();

        let out = r
            .submit_quad(&cameras, quad(Rect::new(1.0, 1.0, 2.0, 2.0), RED), &TriParams::default(), BatchKind::Solid)
            .unwrap();

        assert_eq!(out, SubmitOutcome::Accepted);
        assert_eq!(r.len(BatchKind::Solid), 2);
    }

    #[test]
    fn z_grows_with_submission_order_across_batches() {
        let cameras = screen();
        let mut r = renderer();
        let p = TriParams::default();

        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Solid).unwrap();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Transparent).unwrap();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Solid).unwrap();

        let solid = r.batch(BatchKind::Solid).triangles();
        let transparent = r.batch(BatchKind::Transparent).triangles();
        assert_eq!(solid[0].z, 0.0);
        assert_eq!(transparent[0].z, r.z_step());
        assert_eq!(solid[1].z, 2.0 * r.z_step());
        assert!(solid[1].z < 1.0);
    }

    #[test]
    fn total_capacity_is_bounded_by_depth_precision() {
        let at_limit = BatchCapacities {
            solid: MAX_TOTAL_CAPACITY - 2048 - 256,
            ..BatchCapacities::default()
        };
        let r = TriRenderer::new(RendererConfig { capacities: at_limit }).unwrap();
        assert_eq!(r.z_step(), 1.0 / 65536.0);

        let over = BatchCapacities { solid: at_limit.solid + 1, ..at_limit };
        let err = TriRenderer::new(RendererConfig { capacities: over }).err();
        assert_eq!(
            err,
            Some(RenderError::TotalCapacityTooLarge { total: MAX_TOTAL_CAPACITY + 1, max: MAX_TOTAL_CAPACITY })
        );
    }

    #[test]
    fn later_same_layer_quad_wins_at_max_capacity() {
        let cameras = screen();
        let capacities = BatchCapacities {
            solid: MAX_TOTAL_CAPACITY - 2048 - 256,
            ..BatchCapacities::default()
        };
        let mut r = TriRenderer::new(RendererConfig { capacities }).unwrap();
        let mut backend = RecordingBackend::with_target(SIZE, SIZE);
        let layer = TriParams::default().with_depth(100);

        r.submit_quad(&cameras, quad(full_screen(), RED), &layer, BatchKind::Solid).unwrap();
        r.submit_quad(&cameras, quad(full_screen(), BLUE), &layer, BatchKind::Solid).unwrap();

        let z: Vec<_> = r.batch(BatchKind::Solid).triangles().iter().map(|t| t.z).collect();
        assert!(z.windows(2).all(|w| w[0] < w[1]), "depths not distinct: {z:?}");

        r.render(&cameras, &mut backend).unwrap();
        let target = backend.target().unwrap();
        assert_eq!(target.pixel(1, 1), BLUE.to_array());
        assert_eq!(target.pixel(6, 6), BLUE.to_array());
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    #[test]
    fn clear_is_idempotent() {
        let cameras = screen();
        let mut r = renderer();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), BatchKind::Solid).unwrap();

        r.clear_frame();
        r.clear_frame();

        assert!(r.is_empty());
        for kind in BatchKind::ALL {
            assert_eq!(r.len(kind), 0);
        }
    }

    #[test]
    fn empty_frame_issues_no_draws() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::new();

        let stats = r.render(&cameras, &mut backend).unwrap();

        assert_eq!(backend.draw_count(), 0);
        assert_eq!(stats.total_draw_calls(), 0);
        assert_eq!(stats.cameras, 1);
    }

    #[test]
    fn sequence_restarts_after_clear() {
        let cameras = screen();
        let mut r = renderer();
        let p = TriParams::default();

        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Solid).unwrap();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Solid).unwrap();
        r.clear_frame();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Solid).unwrap();

        assert_eq!(r.batch(BatchKind::Solid).triangles()[0].z, 0.0);
    }

    // ── compositing ───────────────────────────────────────────────────────

    #[test]
    fn single_opaque_triangle_is_one_solid_draw() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::new();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), BatchKind::Solid).unwrap();

        let stats = r.render(&cameras, &mut backend).unwrap();

        assert_eq!(stats.draw_calls(Phase::Solid), 1);
        assert_eq!(stats.total_draw_calls(), 1);
        let draws: Vec<_> = backend.draws().collect();
        assert_eq!(draws, vec![(BatchKind::Solid, &[0u32, 1, 2][..])]);
    }

    #[test]
    fn solid_triangles_group_by_texture() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::new();
        let a = TriParams::default().with_texture(TextureHandle(1));
        let b = TriParams::default().with_texture(TextureHandle(2));

        for p in [&a, &b, &a, &b] {
            r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), p, BatchKind::Solid).unwrap();
        }
        r.render(&cameras, &mut backend).unwrap();

        assert_eq!(backend.draw_count(), 2);
        assert!(backend.draws().all(|(_, idx)| idx.len() == 6));
    }

    #[test]
    fn transparent_draws_back_to_front() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::new();

        for (depth, color) in [(5, RED), (3, GREEN), (4, BLUE)] {
            let p = TriParams::default().with_depth(depth);
            r.submit(&cameras, tri(1.0, 1.0, 2.0, color), &p, BatchKind::Transparent).unwrap();
        }
        r.render(&cameras, &mut backend).unwrap();

        let order: Vec<_> = backend
            .uploaded(BatchKind::Transparent)
            .chunks_exact(3)
            .map(|t| t[0].pos[2].floor() as i32)
            .collect();
        assert_eq!(order, vec![3, 4, 5]);
    }

    #[test]
    fn transparent_ties_keep_submission_order() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::new();

        for color in [RED, GREEN, BLUE] {
            r.submit(&cameras, tri(1.0, 1.0, 2.0, color), &TriParams::default(), BatchKind::Transparent)
                .unwrap();
        }
        r.render(&cameras, &mut backend).unwrap();

        let colors: Vec<_> = backend
            .uploaded(BatchKind::Transparent)
            .chunks_exact(3)
            .map(|t| t[0].color)
            .collect();
        assert_eq!(colors, vec![RED.to_array(), GREEN.to_array(), BLUE.to_array()]);
    }

    #[test]
    fn camera_mask_selects_cameras_at_draw_time() {
        let mut cameras = CameraSet::new();
        let first = cameras.add(Camera::orthographic(full_screen()).with_mask(CameraMask::bit(0)));
        let second = cameras.add(Camera::orthographic(full_screen()).with_mask(CameraMask::bit(1)));
        let mut r = renderer();
        let mut backend = RecordingBackend::new();

        let p = TriParams::default().with_camera_mask(CameraMask::bit(1));
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &p, BatchKind::Solid).unwrap();
        r.render(&cameras, &mut backend).unwrap();

        assert_eq!(backend.draws_per_camera(), vec![(first, 0), (second, 1)]);
    }

    #[test]
    fn stencil_group_clips_later_geometry() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::with_target(SIZE, SIZE);
        let group = StencilGroup::new(3);

        // Clip shape: left half of the screen.
        let clip = TriParams::default().with_stencil_group(group);
        r.submit_quad(&cameras, quad(Rect::new(0.0, 0.0, 4.0, 8.0), GREEN), &clip, BatchKind::Stencil)
            .unwrap();

        // Full-screen quad masked by the clip.
        let masked = TriParams::default().with_stencil_group(group);
        r.submit_quad(&cameras, quad(full_screen(), RED), &masked, BatchKind::Solid).unwrap();

        // Full-screen quad masked by a group nobody wrote.
        let unwritten = TriParams::default().with_stencil_group(StencilGroup::new(2)).with_depth(1);
        r.submit_quad(&cameras, quad(full_screen(), BLUE), &unwritten, BatchKind::Solid).unwrap();

        r.render(&cameras, &mut backend).unwrap();

        let target = backend.target().unwrap();
        assert_eq!(target.pixel(1, 4), RED.to_array());
        assert_eq!(target.pixel(6, 4), Color::BLACK.to_array());
        assert_eq!(target.stencil_at(1, 4), 1 << 3);
        assert_eq!(target.stencil_at(6, 4), 0);
    }

    #[test]
    fn ungrouped_geometry_ignores_stencil_writes() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::with_target(SIZE, SIZE);

        let clip = TriParams::default().with_stencil_group(StencilGroup::new(3));
        r.submit_quad(&cameras, quad(Rect::new(0.0, 0.0, 4.0, 8.0), GREEN), &clip, BatchKind::Stencil)
            .unwrap();
        r.submit_quad(&cameras, quad(full_screen(), RED), &TriParams::default(), BatchKind::Solid)
            .unwrap();
        r.render(&cameras, &mut backend).unwrap();

        let target = backend.target().unwrap();
        assert_eq!(target.pixel(1, 4), RED.to_array());
        assert_eq!(target.pixel(6, 4), RED.to_array());
        assert_eq!(target.stencil_at(1, 4), 1 << 3);
        assert_eq!(target.stencil_at(6, 4), 0);
    }

    #[test]
    fn each_camera_starts_from_cleared_depth_and_stencil() {
        let mut cameras = CameraSet::new();
        let first = cameras.add(Camera::orthographic(full_screen()).with_mask(CameraMask::bit(0)));
        let second = cameras.add(Camera::orthographic(full_screen()).with_mask(CameraMask::bit(1)));
        let mut r = renderer();
        let mut backend = RecordingBackend::with_target(SIZE, SIZE);
        let group = StencilGroup::new(3);
        let left = Rect::new(0.0, 0.0, 4.0, 8.0);
        let right = Rect::new(4.0, 0.0, 4.0, 8.0);

        // First camera: clip bit on the right half, a near quad on the left half.
        let clip = TriParams::default().with_stencil_group(group).with_camera_mask(CameraMask::bit(0));
        r.submit_quad(&cameras, quad(right, GREEN), &clip, BatchKind::Stencil).unwrap();
        let near = TriParams::default().with_depth(5).with_camera_mask(CameraMask::bit(0));
        r.submit_quad(&cameras, quad(left, RED), &near, BatchKind::Solid).unwrap();

        // Second camera: a farther quad on the left, clipped geometry on the right.
        let far = TriParams::default().with_camera_mask(CameraMask::bit(1));
        r.submit_quad(&cameras, quad(left, BLUE), &far, BatchKind::Solid).unwrap();
        let clipped = TriParams::default().with_stencil_group(group).with_camera_mask(CameraMask::bit(1));
        r.submit_quad(&cameras, quad(right, GREEN), &clipped, BatchKind::Solid).unwrap();

        r.render(&cameras, &mut backend).unwrap();

        assert_eq!(backend.draws_per_camera(), vec![(first, 2), (second, 2)]);
        let target = backend.target().unwrap();
        assert_eq!(target.pixel(1, 4), BLUE.to_array());
        assert_eq!(target.pixel(6, 4), Color::BLACK.to_array());
        assert_eq!(target.stencil_at(6, 4), 0);
    }

    #[test]
    fn higher_layer_wins_regardless_of_submission_order() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::with_target(SIZE, SIZE);

        r.submit_quad(&cameras, quad(full_screen(), RED), &TriParams::default().with_depth(2), BatchKind::Solid)
            .unwrap();
        r.submit_quad(&cameras, quad(full_screen(), BLUE), &TriParams::default().with_depth(1), BatchKind::Solid)
            .unwrap();
        r.render(&cameras, &mut backend).unwrap();

        assert_eq!(backend.target().unwrap().pixel(3, 3), RED.to_array());
    }

    #[test]
    fn shader_switch_resends_aux() {
        let cameras = screen();
        let mut r = renderer();
        let mut backend = RecordingBackend::new();

        let sdf = TriParams::default().with_shader(ShaderType::SimpleSdf).with_aux(0.25);
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &TriParams::default(), BatchKind::Solid).unwrap();
        r.submit(&cameras, tri(1.0, 1.0, 2.0, RED), &sdf, BatchKind::Solid).unwrap();
        r.render(&cameras, &mut backend).unwrap();

        let aux: Vec<_> = backend
            .calls()
            .iter()
            .filter_map(|c| match c {
                crate::render::recording::BackendCall::SetAux(v) => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(aux, vec![0.0, 0.25]);
    }
}

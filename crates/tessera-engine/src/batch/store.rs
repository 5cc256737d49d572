use crate::camera::CameraMask;
use crate::error::RenderError;

use super::sort::{by_depth, by_render_state, detect_runs};
use super::{BatchKind, Run, Triangle, TriParams, TriVert, Vertex};

/// Largest triangle capacity a single batch may be configured with.
///
/// Keeps every vertex index representable as `u32` with ample headroom.
pub const MAX_BATCH_CAPACITY: usize = 1 << 20;

/// Per-frame lifecycle of a batch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BatchState {
    Empty,
    Accumulating,
    Sorted,
    Rendered,
}

/// Fixed-capacity triangle store for one [`BatchKind`].
///
/// Performance characteristics:
/// - all arrays are allocated once in `new()` and only ever cleared
/// - `push()` is O(1) and never allocates
/// - `prepare()` sorts in place and rewrites vertices into sorted order
#[derive(Debug)]
pub struct TriangleBatch {
    kind: BatchKind,
    capacity: usize,
    state: BatchState,

    triangles: Vec<Triangle>,
    vertices: Vec<Vertex>,

    // Scratch storage, reused every frame.
    sorted_vertices: Vec<Vertex>,
    indices: Vec<u32>,
    runs: Vec<Run>,

    dropped: u32,
}

impl TriangleBatch {
    pub fn new(kind: BatchKind, capacity: usize) -> Result<Self, RenderError> {
        if capacity == 0 || capacity > MAX_BATCH_CAPACITY {
            return Err(RenderError::InvalidCapacity { kind, capacity });
        }

        Ok(Self {
            kind,
            capacity,
            state: BatchState::Empty,
            triangles: Vec::with_capacity(capacity),
            vertices: Vec::with_capacity(capacity * 3),
            sorted_vertices: Vec::with_capacity(capacity * 3),
            indices: Vec::with_capacity(capacity * 3),
            runs: Vec::with_capacity(capacity),
            dropped: 0,
        })
    }

    #[inline]
    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Number of triangles stored this frame (the high-water mark).
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.triangles.len() >= self.capacity
    }

    /// Triangles dropped this frame because the batch was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Runs computed by the last `prepare()`.
    #[inline]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Stores a triangle at synthesized depth `z`.
    ///
    /// Returns `false` (and counts the drop) if the batch is full.
    pub fn push(&mut self, verts: [TriVert; 3], params: &TriParams, z: f32) -> bool {
        if self.is_full() {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }

        let base = self.vertices.len() as u32;
        self.vertices
            .extend(verts.iter().map(|&v| Vertex::from_tri_vert(v, z)));
        self.triangles.push(Triangle {
            vertex_indices: [base, base + 1, base + 2],
            z,
            camera_mask: params.camera_mask,
            texture: params.texture,
            aux: params.aux,
            shader: params.shader,
            stencil_group: params.stencil_group,
        });

        self.state = BatchState::Accumulating;
        true
    }

    /// Sorts the frame's triangles, rewrites the vertex array into sorted order
    /// and detects runs.
    ///
    /// Solid and stencil batches sort by render state; the transparent batch
    /// sorts by depth. Both sorts are stable, so submission order breaks ties.
    pub fn prepare(&mut self) {
        match self.kind {
            BatchKind::Solid | BatchKind::Stencil => self.triangles.sort_by(by_render_state),
            BatchKind::Transparent => self.triangles.sort_by(by_depth),
        }

        self.sorted_vertices.clear();
        for (i, tri) in self.triangles.iter_mut().enumerate() {
            for &vi in &tri.vertex_indices {
                self.sorted_vertices.push(self.vertices[vi as usize]);
            }
            let base = (i * 3) as u32;
            tri.vertex_indices = [base, base + 1, base + 2];
        }
        std::mem::swap(&mut self.vertices, &mut self.sorted_vertices);

        self.runs.clear();
        detect_runs(&self.triangles, &mut self.runs);

        if !self.triangles.is_empty() {
            self.state = BatchState::Sorted;
        }
    }

    /// Calls `f` for every run that has at least one triangle visible to `mask`,
    /// passing the run and its index list.
    ///
    /// The index list is rebuilt in the batch's scratch buffer for each run.
    pub fn for_each_visible_run(&mut self, mask: CameraMask, mut f: impl FnMut(&Run, &[u32])) {
        let Self { triangles, runs, indices, .. } = self;

        for run in runs.iter() {
            indices.clear();
            for tri in &triangles[run.start..run.end] {
                if tri.camera_mask.intersects(mask) {
                    indices.extend_from_slice(&tri.vertex_indices);
                }
            }
            if !indices.is_empty() {
                f(run, indices.as_slice());
            }
        }
    }

    /// Marks the batch as drawn for this frame.
    pub fn mark_rendered(&mut self) {
        if self.state == BatchState::Sorted {
            self.state = BatchState::Rendered;
        }
    }

    /// Resets the high-water mark. Storage is kept for the next frame.
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.vertices.clear();
        self.runs.clear();
        self.dropped = 0;
        self.state = BatchState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::{StencilGroup, TextureHandle};
    use crate::coords::{Color, Vec2};
    use crate::render::ShaderType;

    use super::*;

    fn verts(x: f32) -> [TriVert; 3] {
        [
            TriVert::solid(Vec2::new(x, 0.0), Color::WHITE),
            TriVert::solid(Vec2::new(x + 1.0, 0.0), Color::WHITE),
            TriVert::solid(Vec2::new(x, 1.0), Color::WHITE),
        ]
    }

    // ── capacity ──────────────────────────────────────────────────────────

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            TriangleBatch::new(BatchKind::Solid, 0),
            Err(RenderError::InvalidCapacity { kind: BatchKind::Solid, capacity: 0 })
        ));
    }

    #[test]
    fn push_beyond_capacity_is_dropped() {
        let mut batch = TriangleBatch::new(BatchKind::Solid, 2).unwrap();
        let p = TriParams::default();
        assert!(batch.push(verts(0.0), &p, 0.0));
        assert!(batch.push(verts(1.0), &p, 0.0));
        assert!(!batch.push(verts(2.0), &p, 0.0));
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.dropped(), 1);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn state_walks_the_frame_lifecycle() {
        let mut batch = TriangleBatch::new(BatchKind::Solid, 4).unwrap();
        assert_eq!(batch.state(), BatchState::Empty);

        batch.push(verts(0.0), &TriParams::default(), 0.0);
        assert_eq!(batch.state(), BatchState::Accumulating);

        batch.prepare();
        assert_eq!(batch.state(), BatchState::Sorted);

        batch.mark_rendered();
        assert_eq!(batch.state(), BatchState::Rendered);

        batch.clear();
        assert_eq!(batch.state(), BatchState::Empty);
        assert!(batch.is_empty());
    }

    #[test]
    fn clear_keeps_allocations() {
        let mut batch = TriangleBatch::new(BatchKind::Transparent, 16).unwrap();
        let before = batch.vertices.capacity();
        for i in 0..16 {
            batch.push(verts(i as f32), &TriParams::default(), 0.0);
        }
        batch.clear();
        batch.clear();
        assert_eq!(batch.len(), 0);
        assert_eq!(batch.vertices.capacity(), before);
    }

    // ── sorting ───────────────────────────────────────────────────────────

    #[test]
    fn prepare_rewrites_vertices_in_sorted_order() {
        let mut batch = TriangleBatch::new(BatchKind::Transparent, 4).unwrap();
        let p = TriParams::default();
        batch.push(verts(50.0), &p, 5.0);
        batch.push(verts(30.0), &p, 3.0);
        batch.push(verts(40.0), &p, 4.0);
        batch.prepare();

        let zs: Vec<f32> = batch.triangles().iter().map(|t| t.z).collect();
        assert_eq!(zs, vec![3.0, 4.0, 5.0]);

        for (i, tri) in batch.triangles().iter().enumerate() {
            let base = (i * 3) as u32;
            assert_eq!(tri.vertex_indices, [base, base + 1, base + 2]);
            assert_eq!(batch.vertices()[base as usize].pos[2], tri.z);
        }
        assert_eq!(batch.vertices()[0].pos[0], 30.0);
    }

    #[test]
    fn solid_prepare_groups_by_render_state() {
        let mut batch = TriangleBatch::new(BatchKind::Solid, 8).unwrap();
        let a = TriParams::default().with_texture(TextureHandle(2));
        let b = TriParams::default().with_texture(TextureHandle(1));
        let c = TriParams::default()
            .with_texture(TextureHandle(2))
            .with_stencil_group(StencilGroup::new(1));
        batch.push(verts(0.0), &a, 0.0);
        batch.push(verts(1.0), &b, 0.0);
        batch.push(verts(2.0), &a, 0.0);
        batch.push(verts(3.0), &c, 0.0);
        batch.prepare();

        let runs: Vec<_> = batch.runs().iter().map(|r| (r.texture.0, r.len())).collect();
        assert_eq!(runs, vec![(1, 1), (2, 2), (2, 1)]);
        // Stable: the two texture-2 triangles keep submission order.
        assert_eq!(batch.vertices()[3].pos[0], 0.0);
        assert_eq!(batch.vertices()[6].pos[0], 2.0);
    }

    // ── per-camera filtering ──────────────────────────────────────────────

    #[test]
    fn visible_runs_filter_by_camera_mask() {
        let mut batch = TriangleBatch::new(BatchKind::Solid, 8).unwrap();
        let cam0 = TriParams::default().with_camera_mask(CameraMask::bit(0));
        let cam1 = TriParams::default()
            .with_camera_mask(CameraMask::bit(1))
            .with_shader(ShaderType::Font);
        batch.push(verts(0.0), &cam0, 0.0);
        batch.push(verts(1.0), &cam1, 0.0);
        batch.push(verts(2.0), &cam0, 0.0);
        batch.prepare();

        let mut seen = Vec::new();
        batch.for_each_visible_run(CameraMask::bit(0), |run, idx| {
            seen.push((run.shader, idx.to_vec()));
        });
        assert_eq!(seen, vec![(ShaderType::Default, vec![0, 1, 2, 3, 4, 5])]);

        let mut count = 0;
        batch.for_each_visible_run(CameraMask::bit(5), |_, _| count += 1);
        assert_eq!(count, 0);
    }
}

use crate::batch::BatchKind;

use super::compositor::Phase;

/// Counters collected by one `render()` call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    /// Cameras composited.
    pub cameras: u32,
    /// Draw calls per phase, indexed by [`Phase::index`].
    pub draw_calls: [u32; 3],
    /// Triangles drawn per phase, summed over cameras.
    pub triangles_drawn: [u32; 3],
    /// Triangles stored per batch, indexed by [`BatchKind::index`].
    pub triangles_stored: [u32; 3],
    /// Triangles dropped per batch because it was full.
    pub triangles_dropped: [u32; 3],
}

impl FrameStats {
    #[inline]
    pub(crate) fn record_draw(&mut self, phase: Phase, triangles: usize) {
        self.draw_calls[phase.index()] += 1;
        self.triangles_drawn[phase.index()] += triangles as u32;
    }

    #[inline]
    pub fn draw_calls(&self, phase: Phase) -> u32 {
        self.draw_calls[phase.index()]
    }

    #[inline]
    pub fn total_draw_calls(&self) -> u32 {
        self.draw_calls.iter().sum()
    }

    #[inline]
    pub fn stored(&self, kind: BatchKind) -> u32 {
        self.triangles_stored[kind.index()]
    }

    #[inline]
    pub fn dropped(&self, kind: BatchKind) -> u32 {
        self.triangles_dropped[kind.index()]
    }
}

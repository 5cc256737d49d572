use crate::batch::BatchKind;

/// Largest combined capacity of the three batches.
///
/// The per-triangle depth offset is `1 / (2 * (total + 1))`; above this limit it
/// drops below one f32 ulp at layer magnitude 128 (2^-16) and equal-layer
/// triangles stop getting distinct depths.
pub const MAX_TOTAL_CAPACITY: usize = (1 << 15) - 1;

/// Fixed triangle capacities of the three batches.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchCapacities {
    pub solid: usize,
    pub transparent: usize,
    pub stencil: usize,
}

impl Default for BatchCapacities {
    fn default() -> Self {
        Self {
            solid: 2048,
            transparent: 2048,
            stencil: 256,
        }
    }
}

impl BatchCapacities {
    #[inline]
    pub fn get(&self, kind: BatchKind) -> usize {
        match kind {
            BatchKind::Solid => self.solid,
            BatchKind::Transparent => self.transparent,
            BatchKind::Stencil => self.stencil,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.solid + self.transparent + self.stencil
    }
}

/// Renderer configuration. All limits are fixed once the renderer is initialized.
#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    pub capacities: BatchCapacities,
}


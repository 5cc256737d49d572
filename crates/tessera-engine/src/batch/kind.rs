use core::fmt;

use crate::error::RenderError;

/// Which of the three per-frame batches a triangle is drawn from.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BatchKind {
    /// Opaque geometry, sorted by render state.
    Solid = 0,
    /// Alpha-blended geometry, sorted back-to-front.
    Transparent = 1,
    /// Clip-mask writers; never visible in the color buffer.
    Stencil = 2,
}

impl BatchKind {
    pub const ALL: [BatchKind; 3] = [BatchKind::Solid, BatchKind::Transparent, BatchKind::Stencil];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            BatchKind::Solid => "solid",
            BatchKind::Transparent => "transparent",
            BatchKind::Stencil => "stencil",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<i32> for BatchKind {
    type Error = RenderError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BatchKind::Solid),
            1 => Ok(BatchKind::Transparent),
            2 => Ok(BatchKind::Stencil),
            other => Err(RenderError::InvalidBatchKind(other)),
        }
    }
}

use bitflags::bitflags;

bitflags! {
    /// Set of camera visibility bits.
    ///
    /// A triangle carries the mask of cameras allowed to see it; a camera carries
    /// the bits it answers to. The two are compatible when they share any bit.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct CameraMask: u32 {
        const NONE = 0;
        const ALL = u32::MAX;
    }
}

impl CameraMask {
    /// Mask with only bit `index` set. Indices of 32 and above yield an empty mask.
    #[inline]
    pub const fn bit(index: u32) -> Self {
        if index < 32 { Self::from_bits_retain(1 << index) } else { Self::empty() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_intersect_only_when_shared() {
        let a = CameraMask::bit(0) | CameraMask::bit(3);
        assert!(a.intersects(CameraMask::bit(3)));
        assert!(!a.intersects(CameraMask::bit(1)));
        assert!(!CameraMask::NONE.intersects(CameraMask::ALL));
    }

    #[test]
    fn out_of_range_bit_is_empty() {
        assert!(CameraMask::bit(32).is_empty());
    }

    #[test]
    fn all_covers_every_bit() {
        assert_eq!(CameraMask::ALL, CameraMask::all());
        assert!(CameraMask::ALL.contains(CameraMask::bit(31)));
        assert_eq!(CameraMask::NONE, CameraMask::empty());
    }
}

use glam::Mat4;

use crate::coords::Rect;
use crate::error::RenderError;

use super::{CameraId, CameraMask, CameraSource};

/// Half-extent of the depth range covered by [`Camera::orthographic`].
///
/// Depth layers are `i8` with a sub-unit sequence offset, so every synthesized
/// z lies strictly inside `(-DEPTH_EXTENT, DEPTH_EXTENT)`.
pub const DEPTH_EXTENT: f32 = 129.0;

/// A single camera owned by a [`CameraSet`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub mask: CameraMask,
    pub view_projection: Mat4,
    pub region: Option<Rect>,
    pub active: bool,
}

impl Camera {
    /// Active camera answering to every mask bit.
    #[inline]
    pub fn new(view_projection: Mat4) -> Self {
        Self {
            mask: CameraMask::ALL,
            view_projection,
            region: None,
            active: true,
        }
    }

    /// Orthographic camera over `world` (top-left origin, +Y down).
    ///
    /// Larger z is nearer: z = +`DEPTH_EXTENT` maps to NDC depth 0 and
    /// z = −`DEPTH_EXTENT` to 1, so the `Less` depth test keeps later layers in front.
    pub fn orthographic(world: Rect) -> Self {
        let w = world.normalized();
        let max = w.max();
        Self::new(Mat4::orthographic_rh(
            w.origin.x,
            max.x,
            max.y,
            w.origin.y,
            -DEPTH_EXTENT,
            DEPTH_EXTENT,
        ))
    }

    #[inline]
    pub fn with_mask(mut self, mask: CameraMask) -> Self {
        self.mask = mask;
        self
    }

    #[inline]
    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }
}

/// Owned list of cameras; ids are indices into the list.
#[derive(Debug, Default, Clone)]
pub struct CameraSet {
    cameras: Vec<Camera>,
}

impl CameraSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, camera: Camera) -> CameraId {
        let id = CameraId(self.cameras.len() as u32);
        self.cameras.push(camera);
        id
    }

    pub fn get(&self, id: CameraId) -> Result<&Camera, RenderError> {
        self.cameras
            .get(id.0 as usize)
            .ok_or(RenderError::InvalidCamera(id))
    }

    pub fn get_mut(&mut self, id: CameraId) -> Result<&mut Camera, RenderError> {
        self.cameras
            .get_mut(id.0 as usize)
            .ok_or(RenderError::InvalidCamera(id))
    }

    pub fn set_active(&mut self, id: CameraId, active: bool) -> Result<(), RenderError> {
        self.get_mut(id)?.active = active;
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

impl CameraSource for CameraSet {
    fn active_cameras(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.cameras
            .iter()
            .enumerate()
            .filter(|(_, c)| c.active)
            .map(|(i, _)| CameraId(i as u32))
    }

    fn flags(&self, id: CameraId) -> Result<CameraMask, RenderError> {
        self.get(id).map(|c| c.mask)
    }

    fn view_projection(&self, id: CameraId) -> Result<Mat4, RenderError> {
        self.get(id).map(|c| c.view_projection)
    }

    fn region(&self, id: CameraId) -> Result<Option<Rect>, RenderError> {
        self.get(id).map(|c| c.region)
    }
}

use glam::Mat4;

use crate::coords::Rect;
use crate::error::RenderError;

use super::CameraMask;

/// Opaque camera handle handed out by a [`CameraSource`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CameraId(pub u32);

/// Everything the renderer reads from one camera for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraView {
    pub id: CameraId,
    pub mask: CameraMask,
    pub view_projection: Mat4,
    /// Screen region in physical pixels. `None` = the whole render area.
    pub region: Option<Rect>,
}

/// Supplies the cameras a frame is rendered through.
///
/// Iteration order is the order cameras are composited in.
pub trait CameraSource {
    /// Active cameras, in render order.
    fn active_cameras(&self) -> impl Iterator<Item = CameraId> + '_;

    /// Visibility bits of `id`.
    fn flags(&self, id: CameraId) -> Result<CameraMask, RenderError>;

    /// Current view-projection matrix of `id`.
    fn view_projection(&self, id: CameraId) -> Result<Mat4, RenderError>;

    /// Screen region of `id`. Defaults to the whole render area.
    fn region(&self, id: CameraId) -> Result<Option<Rect>, RenderError> {
        self.flags(id).map(|_| None)
    }

    /// Gathers the per-frame state of `id`.
    fn view(&self, id: CameraId) -> Result<CameraView, RenderError> {
        Ok(CameraView {
            id,
            mask: self.flags(id)?,
            view_projection: self.view_projection(id)?,
            region: self.region(id)?,
        })
    }
}

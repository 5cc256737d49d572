use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// What the runtime should do after an app callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`Runtime`](crate::window::Runtime).
///
/// GPU-side renderer state (e.g. [`WgpuTriResources`](crate::render::WgpuTriResources))
/// lives in the app; the runtime owns windows and surfaces.
pub trait App {
    /// Raw window events, before the runtime handles resize/close.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// The surface of `window_id` was reconfigured to a new size.
    ///
    /// Size-dependent targets (depth-stencil) can be recreated here instead of
    /// on the next frame.
    fn on_surface_resized(&mut self, window_id: WindowId, gpu: &Gpu<'_>) {
        let _ = (window_id, gpu);
    }

    /// Called once per redraw of each window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}

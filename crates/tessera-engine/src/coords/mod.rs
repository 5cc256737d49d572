//! Coordinate and geometry value types shared by the renderer.
//!
//! World space is whatever the camera's view-projection matrix expects;
//! the renderer never interprets positions itself except after projection,
//! where [-1, 1]² is the visible rectangle.

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::Color;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;

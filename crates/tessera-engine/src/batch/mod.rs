//! Per-frame triangle storage.
//!
//! Responsibilities:
//! - fixed-capacity storage for the three batch kinds (solid, transparent, stencil)
//! - render-state / depth ordering of a frame's triangles
//! - splitting sorted triangles into runs that share one GPU state

mod kind;
mod sort;
mod store;
mod triangle;
mod vertex;

pub use kind::BatchKind;
pub use sort::{Run, AUX_EPSILON};
pub use store::{BatchState, TriangleBatch, MAX_BATCH_CAPACITY};
pub use triangle::{StencilGroup, TextureHandle, TriParams, Triangle};
pub use vertex::{TriVert, Vertex};

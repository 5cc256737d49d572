use crate::camera::CameraMask;
use crate::render::ShaderType;

/// One bit-plane of the 8-bit stencil buffer (0..=7).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StencilGroup(u8);

impl StencilGroup {
    pub const COUNT: u8 = 8;

    /// Maps a raw group id to a group. Anything outside 0..=7 means "no group".
    #[inline]
    pub const fn new(raw: i32) -> Option<Self> {
        if raw >= 0 && raw < Self::COUNT as i32 {
            Some(Self(raw as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self.0
    }

    /// The stencil bit owned by this group.
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self.0
    }
}

/// Opaque texture id understood by the GPU backend.
///
/// `WHITE` is always available and samples as opaque white.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub const WHITE: TextureHandle = TextureHandle(0);
}

/// Render parameters shared by the three vertices of a submitted triangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TriParams {
    pub shader: ShaderType,
    pub texture: TextureHandle,
    /// Shader-specific parameter (e.g. distance-field edge softness).
    pub aux: f32,
    pub stencil_group: Option<StencilGroup>,
    pub camera_mask: CameraMask,
    /// Logical layer; larger layers are drawn in front.
    pub depth: i8,
}

impl Default for TriParams {
    fn default() -> Self {
        Self {
            shader: ShaderType::Default,
            texture: TextureHandle::WHITE,
            aux: 0.0,
            stencil_group: None,
            camera_mask: CameraMask::ALL,
            depth: 0,
        }
    }
}

impl TriParams {
    #[inline]
    pub fn with_shader(mut self, shader: ShaderType) -> Self {
        self.shader = shader;
        self
    }

    #[inline]
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = texture;
        self
    }

    #[inline]
    pub fn with_aux(mut self, aux: f32) -> Self {
        self.aux = aux;
        self
    }

    #[inline]
    pub fn with_stencil_group(mut self, group: Option<StencilGroup>) -> Self {
        self.stencil_group = group;
        self
    }

    #[inline]
    pub fn with_camera_mask(mut self, mask: CameraMask) -> Self {
        self.camera_mask = mask;
        self
    }

    #[inline]
    pub fn with_depth(mut self, depth: i8) -> Self {
        self.depth = depth;
        self
    }
}

/// A stored triangle: vertex indices into its batch plus render state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub vertex_indices: [u32; 3],
    /// Synthesized depth: layer plus submission-order offset.
    pub z: f32,
    pub camera_mask: CameraMask,
    pub texture: TextureHandle,
    pub aux: f32,
    pub shader: ShaderType,
    pub stencil_group: Option<StencilGroup>,
}

//! Shader program table.
//!
//! Every program pairs the shared sprite vertex stage with one fragment stage.
//! The table is compiled as a whole and destroyed as a whole; there is never a
//! partially loaded table.

use crate::error::RenderError;

/// Selects the fragment program a triangle is drawn with.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ShaderType {
    /// Texture modulated by vertex color.
    Default = 0,
    /// Glyph coverage from the red channel, tinted by vertex color.
    Font = 1,
    /// Distance field in texture alpha; aux = edge softness.
    SimpleSdf = 2,
    /// Colored image with a distance-field alpha; aux = edge softness.
    ImageSdf = 3,
}

impl ShaderType {
    pub const ALL: [ShaderType; 4] = [
        ShaderType::Default,
        ShaderType::Font,
        ShaderType::SimpleSdf,
        ShaderType::ImageSdf,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn label(self) -> &'static str {
        match self {
            ShaderType::Default => "tessera default shader",
            ShaderType::Font => "tessera font shader",
            ShaderType::SimpleSdf => "tessera simple sdf shader",
            ShaderType::ImageSdf => "tessera image sdf shader",
        }
    }
}

/// WGSL source text for the program table.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: &'static str,
    /// Fragment sources indexed by [`ShaderType::index`].
    pub fragments: [&'static str; ShaderType::COUNT],
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: include_str!("sprite.vert.wgsl"),
            fragments: [
                include_str!("default.frag.wgsl"),
                include_str!("font.frag.wgsl"),
                include_str!("simple_sdf.frag.wgsl"),
                include_str!("image_sdf.frag.wgsl"),
            ],
        }
    }
}

impl ShaderSources {
    #[inline]
    pub fn fragment(&self, shader: ShaderType) -> &'static str {
        self.fragments[shader.index()]
    }
}

/// Compiled vertex + fragment modules for every [`ShaderType`].
pub struct ShaderTable {
    vertex: wgpu::ShaderModule,
    fragments: Vec<wgpu::ShaderModule>,
}

impl ShaderTable {
    /// Compiles every program. Fails on the first module that does not validate.
    pub fn load(device: &wgpu::Device, sources: &ShaderSources) -> Result<Self, RenderError> {
        log::info!("loading triangle renderer shaders");

        let vertex = compile(device, ShaderType::Default, "tessera sprite vertex", sources.vertex)?;
        let mut fragments = Vec::with_capacity(ShaderType::COUNT);
        for shader in ShaderType::ALL {
            fragments.push(compile(device, shader, shader.label(), sources.fragment(shader))?);
        }

        Ok(Self { vertex, fragments })
    }

    #[inline]
    pub fn vertex(&self) -> &wgpu::ShaderModule {
        &self.vertex
    }

    #[inline]
    pub fn fragment(&self, shader: ShaderType) -> &wgpu::ShaderModule {
        &self.fragments[shader.index()]
    }
}

fn compile(
    device: &wgpu::Device,
    shader: ShaderType,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, RenderError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pollster::block_on(scope.pop()) {
        None => Ok(module),
        Some(err) => {
            log::error!("error compiling {label}: {err}");
            Err(RenderError::ShaderCompile {
                shader,
                message: err.to_string(),
            })
        }
    }
}

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::batch::Vertex;
use crate::render::compositor::{BlendMode, DepthCompare, PassState, StencilMode, StencilOp};
use crate::render::{ShaderTable, ShaderType};

/// Depth-stencil format shared by every pipeline and the depth target.
pub(super) const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Reference value set on every pass; masks select the group bit.
pub(super) const STENCIL_REFERENCE: u32 = 0xff;

// ── draw uniform ──────────────────────────────────────────────────────────

/// Per-draw uniform: camera matrix plus shader parameters (x = aux).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub view_proj: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl DrawUniform {
    pub(super) const SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;
}

// ── pipeline cache ────────────────────────────────────────────────────────

/// Everything baked into one render pipeline.
///
/// wgpu fixes stencil masks and blend state at pipeline creation, so each
/// (program, phase state, stencil mode) combination gets its own pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub shader: ShaderType,
    pub pass: PassState,
    pub stencil: StencilMode,
}

/// Lazily built pipelines plus the layouts they share.
pub(super) struct PipelineCache {
    format: wgpu::TextureFormat,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub(super) fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera draw uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(DrawUniform::SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera triangle pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        Self {
            format,
            uniform_layout,
            texture_layout,
            layout,
            pipelines: HashMap::new(),
        }
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Drops every pipeline; they are rebuilt on demand.
    pub(super) fn invalidate(&mut self) {
        self.pipelines.clear();
    }

    /// Drops every pipeline if the color target format changed.
    pub(super) fn retarget(&mut self, format: wgpu::TextureFormat) {
        if self.format != format {
            log::debug!("surface format changed to {format:?}; rebuilding triangle pipelines");
            self.format = format;
            self.pipelines.clear();
        }
    }

    pub(super) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub(super) fn ensure(&mut self, device: &wgpu::Device, shaders: &ShaderTable, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(key.shader.label()),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module: shaders.vertex(),
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: shaders.fragment(key.shader),
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: blend_state(key.pass.blend),
                    write_mask: if key.pass.color_write {
                        wgpu::ColorWrites::ALL
                    } else {
                        wgpu::ColorWrites::empty()
                    },
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth_stencil_state(key.pass, key.stencil)),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::trace!("created triangle pipeline {key:?}");
        self.pipelines.insert(key, pipeline);
    }
}

// ── fixed-function state ──────────────────────────────────────────────────

fn blend_state(blend: BlendMode) -> Option<wgpu::BlendState> {
    match blend {
        BlendMode::Opaque => Some(wgpu::BlendState::REPLACE),
        // Vertex colors are straight alpha.
        BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
    }
}

fn depth_stencil_state(pass: PassState, stencil: StencilMode) -> wgpu::DepthStencilState {
    let depth_compare = match pass.depth_compare {
        DepthCompare::Always => wgpu::CompareFunction::Always,
        DepthCompare::Less => wgpu::CompareFunction::Less,
    };

    let pass_op = match pass.stencil_op {
        StencilOp::Keep => wgpu::StencilOperation::Keep,
        StencilOp::Replace => wgpu::StencilOperation::Replace,
    };

    let (compare, read_mask, write_mask) = match stencil {
        StencilMode::Write { mask } => (wgpu::CompareFunction::Always, 0xff, mask as u32),
        StencilMode::Test { mask } => (wgpu::CompareFunction::Equal, mask as u32, 0),
        StencilMode::Disabled => (wgpu::CompareFunction::Always, 0, 0),
    };

    let face = wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op,
    };

    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled: pass.depth_write,
        depth_compare,
        stencil: wgpu::StencilState {
            front: face,
            back: face,
            read_mask,
            write_mask,
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use crate::batch::StencilGroup;
    use crate::render::compositor::Phase;

    use super::*;

    // ── stencil translation ───────────────────────────────────────────────

    #[test]
    fn stencil_write_replaces_only_the_group_bit() {
        let group = StencilGroup::new(5);
        let phase = Phase::StencilWrite;
        let ds = depth_stencil_state(phase.pass_state(), phase.stencil_mode(group));

        assert_eq!(ds.stencil.write_mask, 1 << 5);
        assert_eq!(ds.stencil.front.compare, wgpu::CompareFunction::Always);
        assert_eq!(ds.stencil.front.pass_op, wgpu::StencilOperation::Replace);
        assert!(!ds.depth_write_enabled);
        assert_eq!(ds.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn grouped_solid_tests_equal_under_the_group_mask() {
        let ds = depth_stencil_state(Phase::Solid.pass_state(), Phase::Solid.stencil_mode(StencilGroup::new(2)));

        assert_eq!(ds.stencil.read_mask, 1 << 2);
        assert_eq!(ds.stencil.write_mask, 0);
        assert_eq!(ds.stencil.front.compare, wgpu::CompareFunction::Equal);
        assert_eq!(ds.depth_compare, wgpu::CompareFunction::Less);
        assert!(ds.depth_write_enabled);
    }

    #[test]
    fn ungrouped_transparent_ignores_stencil() {
        let phase = Phase::Transparent;
        let ds = depth_stencil_state(phase.pass_state(), phase.stencil_mode(None));

        assert_eq!(ds.stencil.write_mask, 0);
        assert_eq!(ds.stencil.front.compare, wgpu::CompareFunction::Always);
        assert_eq!(blend_state(phase.pass_state().blend), Some(wgpu::BlendState::ALPHA_BLENDING));
    }

    #[test]
    fn draw_uniform_fits_one_dynamic_slot() {
        assert_eq!(DrawUniform::SIZE, 80);
        assert!(DrawUniform::SIZE <= 256);
    }
}

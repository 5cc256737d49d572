use std::collections::HashSet;

use crate::batch::TextureHandle;

/// Bind groups for every texture the renderer can sample.
///
/// Slot 0 is a built-in 1×1 opaque white texture so untextured geometry can
/// share the textured programs.
pub(super) struct TextureRegistry {
    sampler: wgpu::Sampler,
    bind_groups: Vec<wgpu::BindGroup>,

    /// Unknown handles already reported.
    warned: HashSet<TextureHandle>,
}

impl TextureRegistry {
    pub(super) fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera white texture"),
            size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &white,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0xff; 4],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
        );

        let white_view = white.create_view(&wgpu::TextureViewDescriptor::default());

        let mut registry = Self {
            sampler,
            bind_groups: Vec::new(),
            warned: HashSet::new(),
        };
        registry.register(device, layout, &white_view);
        registry
    }

    /// Adds a texture and returns its handle.
    pub(super) fn register(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
    ) -> TextureHandle {
        let handle = TextureHandle(self.bind_groups.len() as u32);
        let bind_group = self.bind_group_for(device, layout, view, handle);
        self.bind_groups.push(bind_group);
        handle
    }

    /// Points an existing handle at a new texture view.
    ///
    /// Returns `false` for handles that were never registered.
    pub(super) fn replace(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        handle: TextureHandle,
        view: &wgpu::TextureView,
    ) -> bool {
        if handle == TextureHandle::WHITE || handle.0 as usize >= self.bind_groups.len() {
            return false;
        }
        let bind_group = self.bind_group_for(device, layout, view, handle);
        self.bind_groups[handle.0 as usize] = bind_group;
        true
    }

    #[inline]
    pub(super) fn contains(&self, handle: TextureHandle) -> bool {
        (handle.0 as usize) < self.bind_groups.len()
    }

    /// Bind group for `handle`; unknown handles sample white.
    pub(super) fn get(&self, handle: TextureHandle) -> &wgpu::BindGroup {
        self.bind_groups
            .get(handle.0 as usize)
            .unwrap_or(&self.bind_groups[TextureHandle::WHITE.0 as usize])
    }

    /// Logs an unknown handle once.
    pub(super) fn note_missing(&mut self, handle: TextureHandle) {
        if !self.contains(handle) && self.warned.insert(handle) {
            log::warn!("unknown texture handle {}; sampling white instead", handle.0);
        }
    }

    fn bind_group_for(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        handle: TextureHandle,
    ) -> wgpu::BindGroup {
        let label = format!("tessera texture {} bind group", handle.0);
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

use super::pipelines::DEPTH_STENCIL_FORMAT;

/// Depth-stencil attachment sized to the render area.
pub(super) struct DepthStencilTarget {
    size: (u32, u32),
    view: Option<wgpu::TextureView>,
}

impl DepthStencilTarget {
    pub(super) fn new() -> Self {
        Self { size: (0, 0), view: None }
    }

    /// Reallocates when the render area changed size.
    pub(super) fn ensure(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if self.view.is_some() && self.size == size {
            return;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera depth-stencil"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        log::debug!("depth-stencil target resized to {}x{}", size.0, size.1);
        self.view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.size = size;
    }

    #[inline]
    pub(super) fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub(super) fn view(&self) -> Option<&wgpu::TextureView> {
        self.view.as_ref()
    }
}

/// GPU buffer that grows to the next power of two when a write does not fit.
pub(super) struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    capacity: u64,
    buffer: Option<wgpu::Buffer>,
}

impl GrowableBuffer {
    pub(super) fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            capacity: 0,
            buffer: None,
        }
    }

    /// Makes room for `required` bytes. Returns `true` if the buffer was reallocated.
    pub(super) fn ensure(&mut self, device: &wgpu::Device, required: u64) -> bool {
        if required <= self.capacity && self.buffer.is_some() {
            return false;
        }

        let new_cap = required.next_power_of_two().max(256);
        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: new_cap,
            usage: self.usage,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
        true
    }

    /// Writes `bytes` at offset 0, growing first if needed.
    pub(super) fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> bool {
        let grew = self.ensure(device, bytes.len() as u64);
        if let Some(buffer) = self.buffer.as_ref() {
            if !bytes.is_empty() {
                queue.write_buffer(buffer, 0, bytes);
            }
        }
        grew
    }

    #[inline]
    pub(super) fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}

use std::sync::Arc;
use wgpu::{
    Adapter, Buffer, Device, DeviceDescriptor, ErrorFilter, Features, Instance, Limits, Queue,
    Surface, Texture,
};

use crate::error::InitError;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Shared GPU context
///
/// Device, queue and adapter are reference counted so the pipeline, the
/// present target and diagnostics can all hold on to the same device.
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a new GPU context without a surface (for offscreen rendering)
    ///
    /// This is useful for compute-only workloads where no window is needed.
    pub async fn new() -> std::result::Result<Self, InitError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        Self::from_instance(&instance, None).await
    }

    /// Create a GPU context compatible with a surface (for window rendering)
    ///
    /// The surface must come from the same `instance`.
    pub async fn new_with_surface(
        instance: &Instance,
        surface: &Surface<'_>,
    ) -> std::result::Result<Self, InitError> {
        Self::from_instance(instance, Some(surface)).await
    }

    async fn from_instance(
        instance: &Instance,
        surface: Option<&Surface<'_>>,
    ) -> std::result::Result<Self, InitError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| InitError::Adapter(format!("{:?}", e)))?;

        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = Self::request_device(&adapter).await?;

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get reference to the queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn limits(&self) -> Limits {
        self.device.limits()
    }

    pub fn features(&self) -> Features {
        self.device.features()
    }

    /// Format capabilities as this adapter reports them
    pub fn format_features(&self, format: wgpu::TextureFormat) -> wgpu::TextureFormatFeatures {
        self.adapter.get_texture_format_features(format)
    }

    /// Run `f` inside validation and out-of-memory error scopes.
    ///
    /// Returns the value together with the first error either scope caught.
    pub async fn scoped<T>(&self, f: impl FnOnce(&Device) -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(ErrorFilter::OutOfMemory);
        self.device.push_error_scope(ErrorFilter::Validation);

        let value = f(&self.device);

        let validation = self.device.pop_error_scope().await;
        let out_of_memory = self.device.pop_error_scope().await;

        (value, validation.or(out_of_memory))
    }

    /// Synchronously read data from a buffer (blocking version)
    ///
    /// WARNING: This blocks the current thread. The buffer must carry MAP_READ.
    pub fn read_buffer_sync(&self, buffer: &Buffer) -> Result<Vec<u8>> {
        let buffer_slice = buffer.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).ok();
        });

        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .map_err(|e| format!("Device poll failed: {:?}", e))?;

        match receiver.recv() {
            Ok(Ok(())) => {
                let data = buffer_slice.get_mapped_range();
                let result = data.to_vec();
                drop(data);
                buffer.unmap();
                Ok(result)
            }
            Ok(Err(e)) => Err(format!("Buffer mapping failed: {:?}", e).into()),
            Err(_) => Err("Channel closed before receiving result".into()),
        }
    }

    /// Copy a device-only buffer (COPY_SRC) into a staging buffer and read it
    pub fn read_device_buffer(&self, buffer: &Buffer) -> Result<Vec<u8>> {
        let size = buffer.size();
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Buffer Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        self.read_buffer_sync(&staging)
    }

    /// Read every texel of mip 0 as tightly packed rows
    pub fn read_texture(&self, texture: &Texture) -> Result<Vec<u8>> {
        let format = texture.format();
        let texel_size = format
            .block_copy_size(None)
            .ok_or_else(|| format!("Format {:?} cannot be copied as a whole", format))?;

        let width = texture.width();
        let height = texture.height();
        let unpadded_bytes_per_row = width * texel_size;
        let padded_bytes_per_row = padded_row_size(unpadded_bytes_per_row);

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Texture Readback Staging Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Texture Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture.size(),
        );
        self.queue.submit(Some(encoder.finish()));

        let padded = self.read_buffer_sync(&staging)?;
        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        for row in padded.chunks_exact(padded_bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
        }

        Ok(pixels)
    }

    /// Request device and queue
    async fn request_device(adapter: &Adapter) -> std::result::Result<(Device, Queue), InitError> {
        let supported_features = adapter.features();
        let mut requested_features = Features::empty();

        // Read-write storage on rgba32float is an adapter-specific capability
        if supported_features.contains(Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES) {
            requested_features |= Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        // Lets the output image match a Bgra8 surface without a swizzle
        if supported_features.contains(Features::BGRA8UNORM_STORAGE) {
            requested_features |= Features::BGRA8UNORM_STORAGE;
        }

        let adapter_limits = adapter.limits();
        let limits = Limits {
            max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
            max_buffer_size: adapter_limits.max_buffer_size,
            max_compute_invocations_per_workgroup: adapter_limits
                .max_compute_invocations_per_workgroup,
            max_compute_workgroup_size_x: adapter_limits.max_compute_workgroup_size_x,
            max_compute_workgroup_size_y: adapter_limits.max_compute_workgroup_size_y,
            max_texture_dimension_2d: adapter_limits.max_texture_dimension_2d,
            ..Default::default()
        };

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Ray Viewer Device"),
                required_features: requested_features,
                required_limits: limits,
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| InitError::Device(format!("{:?}", e)))
    }
}

/// Row pitch rounded up to the copy alignment
pub fn padded_row_size(unpadded: u32) -> u32 {
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(alignment) * alignment
}

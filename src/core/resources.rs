use std::error::Error;

use bytemuck::Pod;
use wgpu::util::DeviceExt;
use wgpu::{BindingResource, Buffer, Texture, TextureFormat, TextureView};

use super::bindings::DeviceResource;
use super::gpu_context::GpuContext;
use super::surface::clamp_extent;
use crate::error::InitError;
use crate::scene::Scene;
use crate::types::{DiscData, PlaneData, SceneUniform, SphereData};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Progressive accumulation: rgb running mean, alpha sample count
pub const ACCUMULATION_FORMAT: TextureFormat = TextureFormat::Rgba32Float;

/// Accumulation and output images, recreated together on resize
pub struct FrameImages {
    pub accumulation: Texture,
    pub accumulation_view: TextureView,
    pub output: Texture,
    pub output_view: TextureView,
    pub width: u32,
    pub height: u32,
}

impl FrameImages {
    fn new(gpu: &GpuContext, output_format: TextureFormat, width: u32, height: u32) -> Self {
        let device = gpu.device();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let accumulation = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Accumulation Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ACCUMULATION_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let output = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Output Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: output_format,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let accumulation_view = accumulation.create_view(&wgpu::TextureViewDescriptor::default());
        let output_view = output.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            accumulation,
            accumulation_view,
            output,
            output_view,
            width,
            height,
        }
    }
}

/// Device mirrors of the scene plus the per-size images
pub struct DeviceResources {
    gpu: GpuContext,
    uniform_buffer: Buffer,
    sphere_buffer: Buffer,
    plane_buffer: Buffer,
    disc_buffer: Buffer,
    sphere_count: usize,
    plane_count: usize,
    disc_count: usize,
    output_format: TextureFormat,
    images: FrameImages,
}

impl DeviceResources {
    /// Allocate the uniform and primitive buffers and size the images.
    ///
    /// Zero-sized dimensions are bumped to 1 so the images always exist.
    pub async fn initialize(
        gpu: &GpuContext,
        scene: &Scene,
        output_format: TextureFormat,
        width: u32,
        height: u32,
    ) -> std::result::Result<Self, InitError> {
        Self::check_formats(gpu, output_format)?;

        let uniform_buffer = Self::create_buffer(
            gpu,
            "Scene Uniform Buffer",
            &[scene.uniform()],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )
        .await?;
        let sphere_buffer = Self::create_storage(gpu, "Sphere Buffer", scene.spheres()).await?;
        let plane_buffer = Self::create_storage(gpu, "Plane Buffer", scene.planes()).await?;
        let disc_buffer = Self::create_storage(gpu, "Disc Buffer", scene.discs()).await?;

        let (width, height) = clamp_extent(width, height, gpu.limits().max_texture_dimension_2d);
        let (images, error) =
            gpu.scoped(|_| FrameImages::new(gpu, output_format, width, height)).await;
        if let Some(error) = error {
            return Err(InitError::Allocation {
                label: "Frame Images",
                size: image_bytes(output_format, width, height),
                message: error.to_string(),
            });
        }

        log::info!(
            "Device resources ready: {}x{} images, output {:?}",
            images.width,
            images.height,
            output_format
        );

        Ok(Self {
            gpu: gpu.clone(),
            uniform_buffer,
            sphere_buffer,
            plane_buffer,
            disc_buffer,
            sphere_count: scene.spheres().len(),
            plane_count: scene.planes().len(),
            disc_count: scene.discs().len(),
            output_format,
            images,
        })
    }

    fn check_formats(gpu: &GpuContext, output_format: TextureFormat) -> std::result::Result<(), InitError> {
        let adapter_specific = gpu
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);
        let accumulation = gpu.format_features(ACCUMULATION_FORMAT);
        if !adapter_specific
            || !accumulation
                .flags
                .contains(wgpu::TextureFormatFeatureFlags::STORAGE_READ_WRITE)
        {
            return Err(InitError::UnsupportedFormat {
                format: ACCUMULATION_FORMAT,
                missing: "read-write storage access",
            });
        }

        let output = gpu.format_features(output_format);
        if !output
            .allowed_usages
            .contains(wgpu::TextureUsages::STORAGE_BINDING)
        {
            return Err(InitError::UnsupportedFormat {
                format: output_format,
                missing: "storage binding",
            });
        }

        Ok(())
    }

    /// Storage buffer for one primitive category; never smaller than one record
    async fn create_storage<T: Pod>(
        gpu: &GpuContext,
        label: &'static str,
        records: &[T],
    ) -> std::result::Result<Buffer, InitError> {
        let placeholder = [<T as bytemuck::Zeroable>::zeroed()];
        let contents = if records.is_empty() { &placeholder[..] } else { records };

        Self::create_buffer(
            gpu,
            label,
            contents,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        )
        .await
    }

    async fn create_buffer<T: Pod>(
        gpu: &GpuContext,
        label: &'static str,
        contents: &[T],
        usage: wgpu::BufferUsages,
    ) -> std::result::Result<Buffer, InitError> {
        let bytes: &[u8] = bytemuck::cast_slice(contents);
        let size = bytes.len() as u64;

        let limits = gpu.limits();
        let max_binding = if usage.contains(wgpu::BufferUsages::UNIFORM) {
            limits.max_uniform_buffer_binding_size
        } else {
            limits.max_storage_buffer_binding_size
        };
        if size > max_binding as u64 {
            return Err(InitError::Allocation {
                label,
                size,
                message: format!("exceeds the {} byte binding limit", max_binding),
            });
        }

        let (buffer, error) = gpu.scoped(|device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage: usage | wgpu::BufferUsages::COPY_SRC,
            })
        })
        .await;

        match error {
            Some(error) => Err(InitError::Allocation {
                label,
                size,
                message: error.to_string(),
            }),
            None => Ok(buffer),
        }
    }

    /// Overwrite the whole uniform record; later submissions observe it
    pub fn sync_uniform(&self, uniform: &SceneUniform) {
        self.gpu
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Recreate both images at the new size, discarding their contents.
    ///
    /// Sizes beyond the device's 2D texture limit are clamped to it. Returns
    /// false (and keeps the old images) for zero-sized requests or when the
    /// device rejects the allocation.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-sized resize to {}x{}", width, height);
            return false;
        }

        let max_dimension = self.gpu.limits().max_texture_dimension_2d;
        let (width, height) = clamp_extent(width, height, max_dimension);

        let gpu = &self.gpu;
        let output_format = self.output_format;
        let (images, error) = pollster::block_on(
            gpu.scoped(|_| FrameImages::new(gpu, output_format, width, height)),
        );
        if let Some(error) = error {
            log::warn!("Keeping {}x{} frame images: {}", self.images.width, self.images.height, error);
            return false;
        }

        self.images = images;
        log::debug!("Frame images resized to {}x{}", width, height);
        true
    }

    pub fn uniform_buffer(&self) -> &Buffer {
        &self.uniform_buffer
    }

    pub fn sphere_buffer(&self) -> &Buffer {
        &self.sphere_buffer
    }

    pub fn plane_buffer(&self) -> &Buffer {
        &self.plane_buffer
    }

    pub fn disc_buffer(&self) -> &Buffer {
        &self.disc_buffer
    }

    pub fn images(&self) -> &FrameImages {
        &self.images
    }

    pub fn accumulation(&self) -> &Texture {
        &self.images.accumulation
    }

    pub fn output(&self) -> &Texture {
        &self.images.output
    }

    pub fn output_format(&self) -> TextureFormat {
        self.output_format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.images.width, self.images.height)
    }

    pub fn binding_resource(&self, resource: DeviceResource) -> BindingResource<'_> {
        match resource {
            DeviceResource::SceneUniform => self.uniform_buffer.as_entire_binding(),
            DeviceResource::Spheres => self.sphere_buffer.as_entire_binding(),
            DeviceResource::Planes => self.plane_buffer.as_entire_binding(),
            DeviceResource::Discs => self.disc_buffer.as_entire_binding(),
            DeviceResource::Accumulation => {
                BindingResource::TextureView(&self.images.accumulation_view)
            }
            DeviceResource::Output => BindingResource::TextureView(&self.images.output_view),
        }
    }

    pub fn read_uniform(&self) -> Result<SceneUniform> {
        let bytes = self.gpu.read_device_buffer(&self.uniform_buffer)?;
        Ok(bytemuck::pod_read_unaligned(&bytes[..std::mem::size_of::<SceneUniform>()]))
    }

    pub fn read_spheres(&self) -> Result<Vec<SphereData>> {
        self.read_records(&self.sphere_buffer, self.sphere_count)
    }

    pub fn read_planes(&self) -> Result<Vec<PlaneData>> {
        self.read_records(&self.plane_buffer, self.plane_count)
    }

    pub fn read_discs(&self) -> Result<Vec<DiscData>> {
        self.read_records(&self.disc_buffer, self.disc_count)
    }

    fn read_records<T: Pod>(&self, buffer: &Buffer, count: usize) -> Result<Vec<T>> {
        let bytes = self.gpu.read_device_buffer(buffer)?;
        Ok(decode_records(&bytes).into_iter().take(count).collect())
    }

    /// Accumulation texels, row-major, `[r, g, b, samples]`
    pub fn read_accumulation(&self) -> Result<Vec<[f32; 4]>> {
        let bytes = self.gpu.read_texture(&self.images.accumulation)?;
        Ok(decode_records(&bytes))
    }

    /// Output texels, row-major, in the output format's byte order
    pub fn read_output(&self) -> Result<Vec<u8>> {
        self.gpu.read_texture(&self.images.output)
    }
}

fn decode_records<T: Pod>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(std::mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

fn image_bytes(output_format: TextureFormat, width: u32, height: u32) -> u64 {
    let texel = ACCUMULATION_FORMAT.block_copy_size(None).unwrap_or(16)
        + output_format.block_copy_size(None).unwrap_or(4);
    texel as u64 * width as u64 * height as u64
}

use std::sync::Arc;
use wgpu::{PresentMode, Surface, SurfaceConfiguration, SurfaceTexture, Texture, TextureFormat};

use super::gpu_context::GpuContext;
use crate::error::{InitError, SkipReason};

/// An image handed out for one frame
pub trait PresentableImage {
    fn texture(&self) -> &Texture;
}

/// Something the pipeline can blit into and present, once per frame
pub trait PresentTarget {
    type Image: PresentableImage;

    /// Format of the presentable images
    fn format(&self) -> TextureFormat;

    fn size(&self) -> (u32, u32);

    /// Reconfigure for a new size; zero-sized requests are ignored
    fn resize(&mut self, width: u32, height: u32);

    fn acquire(&mut self) -> Result<Self::Image, SkipReason>;

    fn present(&mut self, image: Self::Image);
}

/// Format the kernels write to before the blit: the display format without
/// its sRGB suffix. The post-process kernel encodes sRGB itself.
pub fn storage_format_for(format: TextureFormat) -> TextureFormat {
    format.remove_srgb_suffix()
}

/// Clamp a requested extent into `1..=max_dimension` on both axes
pub fn clamp_extent(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    (width.clamp(1, max_dimension), height.clamp(1, max_dimension))
}

impl PresentableImage for SurfaceTexture {
    fn texture(&self) -> &Texture {
        &self.texture
    }
}

/// Window swapchain configured as a copy destination
pub struct WindowSurface {
    gpu: GpuContext,
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

impl WindowSurface {
    pub fn new(
        gpu: &GpuContext,
        surface: Surface<'static>,
        width: u32,
        height: u32,
        present_mode: PresentMode,
    ) -> Result<Self, InitError> {
        let caps = surface.get_capabilities(gpu.adapter());

        if !caps.usages.contains(wgpu::TextureUsages::COPY_DST) {
            return Err(InitError::SurfaceUnsupported("copy-destination usage"));
        }

        let bgra_storage = gpu.features().contains(wgpu::Features::BGRA8UNORM_STORAGE);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| match storage_format_for(*f) {
                TextureFormat::Rgba8Unorm => true,
                TextureFormat::Bgra8Unorm => bgra_storage,
                _ => false,
            })
            .ok_or(InitError::SurfaceUnsupported("a storage-compatible format"))?;

        let present_mode = if caps.present_modes.contains(&present_mode) {
            present_mode
        } else {
            log::warn!("Present mode {:?} unsupported, falling back to Fifo", present_mode);
            PresentMode::Fifo
        };

        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) =
            clamp_extent(width, height, gpu.limits().max_texture_dimension_2d);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(gpu.device(), &config);
        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            format,
            present_mode
        );

        Ok(Self {
            gpu: gpu.clone(),
            surface,
            config,
        })
    }

    fn reconfigure(&self) {
        self.surface.configure(self.gpu.device(), &self.config);
    }
}

impl PresentTarget for WindowSurface {
    type Image = SurfaceTexture;

    fn format(&self) -> TextureFormat {
        self.config.format
    }

    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let (width, height) =
            clamp_extent(width, height, self.gpu.limits().max_texture_dimension_2d);
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    fn acquire(&mut self) -> Result<SurfaceTexture, SkipReason> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(error) => {
                // The next frame gets a fresh swapchain
                if matches!(error, wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) {
                    self.reconfigure();
                }
                Err(error.into())
            }
        }
    }

    fn present(&mut self, image: SurfaceTexture) {
        image.present();
    }
}

/// Offscreen image handed out by [`OffscreenTarget`]
pub struct OffscreenImage(Arc<Texture>);

impl PresentableImage for OffscreenImage {
    fn texture(&self) -> &Texture {
        &self.0
    }
}

/// Texture-backed present target for headless rendering and tests
pub struct OffscreenTarget {
    gpu: GpuContext,
    format: TextureFormat,
    texture: Arc<Texture>,
    available: bool,
    presented: u64,
}

impl OffscreenTarget {
    pub fn new(gpu: &GpuContext, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            gpu: gpu.clone(),
            format,
            texture: Arc::new(Self::create_texture(gpu, width.max(1), height.max(1), format)),
            available: true,
            presented: 0,
        }
    }

    fn create_texture(gpu: &GpuContext, width: u32, height: u32, format: TextureFormat) -> Texture {
        gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Simulate a surface that cannot hand out an image
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn presented_count(&self) -> u64 {
        self.presented
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }
}

impl PresentTarget for OffscreenTarget {
    type Image = OffscreenImage;

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.texture = Arc::new(Self::create_texture(&self.gpu, width, height, self.format));
    }

    fn acquire(&mut self) -> Result<OffscreenImage, SkipReason> {
        if !self.available {
            return Err(SkipReason::SurfaceUnavailable);
        }
        Ok(OffscreenImage(self.texture.clone()))
    }

    fn present(&mut self, _image: OffscreenImage) {
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_format_strips_srgb() {
        assert_eq!(storage_format_for(TextureFormat::Bgra8UnormSrgb), TextureFormat::Bgra8Unorm);
        assert_eq!(storage_format_for(TextureFormat::Rgba8UnormSrgb), TextureFormat::Rgba8Unorm);
        assert_eq!(storage_format_for(TextureFormat::Rgba8Unorm), TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_clamp_extent() {
        assert_eq!(clamp_extent(800, 600, 8192), (800, 600));
        assert_eq!(clamp_extent(9000, 600, 8192), (8192, 600));
        assert_eq!(clamp_extent(9000, 20000, 8192), (8192, 8192));
        assert_eq!(clamp_extent(0, 0, 8192), (1, 1));
        assert_eq!(clamp_extent(8192, 8192, 8192), (8192, 8192));
    }

    #[test]
    fn test_clamp_extent_degenerate_limit() {
        assert_eq!(clamp_extent(640, 480, 0), (1, 1));
    }
}

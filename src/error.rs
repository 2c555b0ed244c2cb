use thiserror::Error;

/// Fatal failures while building the pipeline; nothing is returned half-built
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),

    #[error("device request failed: {0}")]
    Device(String),

    #[error("surface creation failed: {0}")]
    Surface(String),

    #[error("surface does not support {0}")]
    SurfaceUnsupported(&'static str),

    #[error("texture format {format:?} lacks {missing}")]
    UnsupportedFormat {
        format: wgpu::TextureFormat,
        missing: &'static str,
    },

    #[error("kernel `{0}` not found")]
    KernelNotFound(String),

    #[error("kernel `{name}` failed to compile: {message}")]
    KernelCompilation { name: String, message: String },

    #[error("pipeline `{name}` could not be created: {message}")]
    Pipeline { name: String, message: String },

    #[error("allocation of `{label}` ({size} bytes) refused: {message}")]
    Allocation {
        label: &'static str,
        size: u64,
        message: String,
    },
}

/// Why a frame was dropped; the next `draw()` simply tries again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SurfaceTimeout,
    SurfaceOutdated,
    SurfaceLost,
    OutOfMemory,
    /// The present target had no image to hand out
    SurfaceUnavailable,
    /// The presentable image and the output image disagree on extent
    SizeMismatch,
}

impl From<wgpu::SurfaceError> for SkipReason {
    fn from(error: wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Timeout => SkipReason::SurfaceTimeout,
            wgpu::SurfaceError::Outdated => SkipReason::SurfaceOutdated,
            wgpu::SurfaceError::Lost => SkipReason::SurfaceLost,
            wgpu::SurfaceError::OutOfMemory => SkipReason::OutOfMemory,
            _ => SkipReason::SurfaceUnavailable,
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::SurfaceTimeout => "surface timed out",
            SkipReason::SurfaceOutdated => "surface outdated",
            SkipReason::SurfaceLost => "surface lost",
            SkipReason::OutOfMemory => "out of memory",
            SkipReason::SurfaceUnavailable => "no presentable image",
            SkipReason::SizeMismatch => "presentable image size mismatch",
        };
        f.write_str(text)
    }
}

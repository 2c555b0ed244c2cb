pub mod bindings;
pub mod controller;
pub mod frame_pipeline;
pub mod frame_stats;
pub mod gpu_context;
pub mod input_adapter;
pub mod kernels;
pub mod navigation;
pub mod resources;
pub mod surface;

pub use controller::{Button, InputEvent};
pub use frame_pipeline::{FramePipeline, PipelineSettings};
pub use gpu_context::GpuContext;
pub use navigation::{NavigationController, NavigationSettings};
pub use resources::DeviceResources;
pub use surface::{OffscreenTarget, PresentTarget, PresentableImage, WindowSurface};

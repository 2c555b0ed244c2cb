use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use wgpu::BindGroup;

use super::bindings::{POST_PROCESS_BINDINGS, TRACE_BINDINGS};
use super::controller::{Button, InputEvent};
use super::frame_stats::FrameStats;
use super::gpu_context::GpuContext;
use super::kernels::{ComputeKernel, KernelLibrary, WorkgroupShape, POST_PROCESS_KERNEL, TRACE_KERNEL};
use super::navigation::{NavigationController, NavigationSettings};
use super::resources::DeviceResources;
use super::surface::{clamp_extent, storage_format_for, PresentTarget, PresentableImage};
use crate::error::{InitError, SkipReason};
use crate::frame::FrameOutcome;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub navigation: NavigationSettings,
    /// How often frame statistics are logged; zero disables them
    pub stats_interval: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            navigation: NavigationSettings::default(),
            stats_interval: Duration::from_secs(2),
        }
    }
}

/// Per-frame driver: navigation, uniform upload, trace and post-process
/// dispatches, blit, submit and present.
///
/// Owns the scene; it is only mutated by the input entry points and by
/// `draw()` itself.
pub struct FramePipeline<T: PresentTarget> {
    gpu: GpuContext,
    target: T,
    scene: Scene,
    resources: DeviceResources,
    trace: ComputeKernel,
    post_process: ComputeKernel,
    trace_bind_group: BindGroup,
    post_process_bind_group: BindGroup,
    navigation: NavigationController,
    input_sender: Sender<InputEvent>,
    input_receiver: Receiver<InputEvent>,
    stats: FrameStats,
}

impl<T: PresentTarget> FramePipeline<T> {
    pub async fn new(
        gpu: GpuContext,
        target: T,
        scene: Scene,
        settings: PipelineSettings,
    ) -> Result<Self, InitError> {
        Self::with_library(gpu, target, scene, settings, &KernelLibrary::builtin()).await
    }

    pub async fn with_library(
        gpu: GpuContext,
        target: T,
        scene: Scene,
        settings: PipelineSettings,
        library: &KernelLibrary,
    ) -> Result<Self, InitError> {
        let output_format = storage_format_for(target.format());
        let (width, height) = target.size();

        let resources =
            DeviceResources::initialize(&gpu, &scene, output_format, width, height).await?;

        let shape = WorkgroupShape::from_limits(&gpu.limits());
        let trace = ComputeKernel::build(
            &gpu,
            library,
            TRACE_KERNEL,
            TRACE_BINDINGS,
            shape,
            output_format,
        )
        .await?;
        let post_process = ComputeKernel::build(
            &gpu,
            library,
            POST_PROCESS_KERNEL,
            POST_PROCESS_BINDINGS,
            shape,
            output_format,
        )
        .await?;

        let trace_bind_group = trace.bind(&gpu, &resources);
        let post_process_bind_group = post_process.bind(&gpu, &resources);

        let (input_sender, input_receiver) = mpsc::channel();

        log::info!(
            "Frame pipeline ready: {}x{}, work-group {}x{}",
            width,
            height,
            shape.width,
            shape.height
        );

        Ok(Self {
            gpu,
            target,
            scene,
            resources,
            trace,
            post_process,
            trace_bind_group,
            post_process_bind_group,
            navigation: NavigationController::new(settings.navigation),
            input_sender,
            input_receiver,
            stats: FrameStats::new(settings.stats_interval),
        })
    }

    /// Render and present one frame.
    ///
    /// A frame without a presentable image is skipped before anything
    /// changes: the frame index stays put and a pending camera change is
    /// carried into the next frame.
    pub fn draw(&mut self) -> FrameOutcome {
        self.drain_input();

        let image = match self.target.acquire() {
            Ok(image) => image,
            Err(reason) => return self.skip(reason),
        };

        let (width, height) = self.resources.size();
        let texture = image.texture();
        if texture.width() != width || texture.height() != height {
            return self.skip(SkipReason::SizeMismatch);
        }

        self.scene.frame_index = self.scene.frame_index.wrapping_add(1);
        self.navigation.apply_movement(&mut self.scene);
        self.resources.sync_uniform(&self.scene.uniform());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.trace
            .dispatch(&mut encoder, &self.trace_bind_group, width, height);
        self.post_process
            .dispatch(&mut encoder, &self.post_process_bind_group, width, height);

        encoder.copy_texture_to_texture(
            self.resources.output().as_image_copy(),
            texture.as_image_copy(),
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.gpu.queue().submit(Some(encoder.finish()));
        self.stats.track_submission(self.gpu.queue());
        self.target.present(image);

        self.scene.did_change_camera = false;
        self.stats.frame_presented();

        FrameOutcome::Presented {
            frame_index: self.scene.frame_index,
        }
    }

    fn skip(&self, reason: SkipReason) -> FrameOutcome {
        match reason {
            SkipReason::SurfaceTimeout | SkipReason::SurfaceOutdated | SkipReason::SizeMismatch => {
                log::debug!("Skipping frame: {}", reason)
            }
            _ => log::warn!("Skipping frame: {}", reason),
        }
        FrameOutcome::Skipped(reason)
    }

    /// Reconfigure the target and recreate the images; zero sizes are ignored
    /// and sizes past the device's texture limit are clamped to it
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let max_dimension = self.gpu.limits().max_texture_dimension_2d;
        let (clamped_width, clamped_height) = clamp_extent(width, height, max_dimension);
        if (clamped_width, clamped_height) != (width, height) {
            log::warn!(
                "Resize to {}x{} exceeds the {} texel texture limit, using {}x{}",
                width,
                height,
                max_dimension,
                clamped_width,
                clamped_height
            );
        }
        let (width, height) = (clamped_width, clamped_height);

        self.target.resize(width, height);
        if self.resources.resize(width, height) {
            self.trace_bind_group = self.trace.bind(&self.gpu, &self.resources);
            self.post_process_bind_group = self.post_process.bind(&self.gpu, &self.resources);
        }
    }

    pub fn key_down(&mut self, button: Button) {
        self.navigation.key_down(button);
    }

    pub fn key_up(&mut self, button: Button) {
        self.navigation.key_up(button);
    }

    pub fn mouse_delta(&mut self, dx: f32, dy: f32) {
        self.navigation.mouse_delta(dx, dy, &mut self.scene);
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(button) => self.key_down(button),
            InputEvent::KeyUp(button) => self.key_up(button),
            InputEvent::MouseDelta { dx, dy } => self.mouse_delta(dx, dy),
        }
    }

    /// Queue for input produced on other threads; drained at the start of `draw()`
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.input_sender.clone()
    }

    fn drain_input(&mut self) {
        while let Ok(event) = self.input_receiver.try_recv() {
            self.handle_input(event);
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn resources(&self) -> &DeviceResources {
        &self.resources
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn workgroup_shape(&self) -> WorkgroupShape {
        self.trace.shape()
    }
}

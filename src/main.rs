use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use ray_viewer::cli::Cli;
use ray_viewer::config::ViewerConfig;
use ray_viewer::core::input_adapter::WinitInput;
use ray_viewer::core::{Button, FramePipeline, GpuContext, InputEvent, WindowSurface};
use ray_viewer::scenes::create_scene;

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    pipeline: Option<FramePipeline<WindowSurface>>,
    cursor_grabbed: bool,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            pipeline: None,
            cursor_grabbed: false,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("Ray Viewer")
                        .with_inner_size(winit::dpi::PhysicalSize::new(
                            self.config.width,
                            self.config.height,
                        )),
                )
                .context("Failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let gpu = pollster::block_on(GpuContext::new_with_surface(&instance, &surface))?;

        let scene = create_scene(&self.config.scene)
            .ok_or_else(|| anyhow!("unknown scene `{}`", self.config.scene))?;

        let size = window.inner_size();
        let target = WindowSurface::new(
            &gpu,
            surface,
            size.width,
            size.height,
            self.config.present_mode.into(),
        )?;

        let pipeline = pollster::block_on(FramePipeline::new(
            gpu,
            target,
            scene,
            self.config.pipeline_settings(),
        ))
        .context("Failed to build frame pipeline")?;

        self.window = Some(window);
        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn set_cursor_grab(&mut self, grab: bool) {
        let Some(window) = &self.window else {
            return;
        };

        let result = if grab {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };

        match result {
            Ok(()) => {
                window.set_cursor_visible(!grab);
                self.cursor_grabbed = grab;
            }
            Err(e) => log::warn!("Cursor grab change failed: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(pipeline) = &mut self.pipeline {
                    pipeline.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.set_cursor_grab(false),
            WindowEvent::RedrawRequested => {
                if let Some(pipeline) = &mut self.pipeline {
                    pipeline.draw();
                }
            }
            _ => match WinitInput::translate_window_event(&event) {
                Some(InputEvent::KeyDown(Button::Escape)) => {
                    if self.cursor_grabbed {
                        self.set_cursor_grab(false);
                    } else {
                        event_loop.exit();
                    }
                }
                Some(InputEvent::KeyDown(Button::MouseLeft)) if !self.cursor_grabbed => {
                    self.set_cursor_grab(true);
                }
                Some(input) => {
                    if let Some(pipeline) = &mut self.pipeline {
                        pipeline.handle_input(input);
                    }
                }
                None => {}
            },
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if !self.cursor_grabbed {
            return;
        }

        if let (Some(input), Some(pipeline)) =
            (WinitInput::translate_device_event(&event), &mut self.pipeline)
        {
            pipeline.handle_input(input);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ViewerConfig::resolve(&cli)?;
    log::info!("Starting with {:?}", config);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    println!("Ray Viewer - click to look around, WASD/arrows to move, Escape to release/quit");
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

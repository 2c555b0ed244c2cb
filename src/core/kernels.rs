use wgpu::{BindGroup, BindGroupLayout, CommandEncoder, ComputePipeline, Limits, TextureFormat};

use super::bindings::{self, Binding};
use super::gpu_context::GpuContext;
use super::resources::DeviceResources;
use crate::error::InitError;

pub const TRACE_KERNEL: &str = "trace";
pub const POST_PROCESS_KERNEL: &str = "post-process";

/// Placeholder in kernel sources for the output texel format
const OUTPUT_FORMAT_TOKEN: &str = "$OUTPUT_FORMAT";

/// Lanes the device executes in lockstep; clamped to the reported limits
pub const EXECUTION_WIDTH: u32 = 32;

/// Invocations per work-group along x and y
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupShape {
    pub width: u32,
    pub height: u32,
}

impl WorkgroupShape {
    pub fn from_limits(limits: &Limits) -> Self {
        Self::derive(
            EXECUTION_WIDTH,
            limits.max_compute_invocations_per_workgroup,
            limits.max_compute_workgroup_size_x,
            limits.max_compute_workgroup_size_y,
        )
    }

    /// `(w, max(1, max_invocations / w))`, with both sides kept inside the limits
    pub fn derive(execution_width: u32, max_invocations: u32, max_x: u32, max_y: u32) -> Self {
        let width = execution_width.clamp(1, max_x.min(max_invocations).max(1));
        let height = (max_invocations / width).max(1).min(max_y.max(1));
        Self { width, height }
    }

    /// Whole work-groups needed to cover a `width` x `height` image
    pub fn group_count(&self, width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(self.width), height.div_ceil(self.height))
    }
}

/// WGSL spelling of a storage texel format
pub fn wgsl_format_name(format: TextureFormat) -> Option<&'static str> {
    match format {
        TextureFormat::Rgba8Unorm => Some("rgba8unorm"),
        TextureFormat::Bgra8Unorm => Some("bgra8unorm"),
        TextureFormat::Rgba16Float => Some("rgba16float"),
        TextureFormat::Rgba32Float => Some("rgba32float"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KernelSource {
    pub name: &'static str,
    pub source: &'static str,
    pub entry_point: &'static str,
}

impl KernelSource {
    /// Source text with the output format substituted
    pub fn specialise(&self, output_format: TextureFormat) -> Result<String, InitError> {
        if !self.source.contains(OUTPUT_FORMAT_TOKEN) {
            return Ok(self.source.to_string());
        }

        let name = wgsl_format_name(output_format).ok_or(InitError::UnsupportedFormat {
            format: output_format,
            missing: "a WGSL storage texel spelling",
        })?;
        Ok(self.source.replace(OUTPUT_FORMAT_TOKEN, name))
    }
}

/// Kernels addressable by name
#[derive(Debug, Clone)]
pub struct KernelLibrary {
    kernels: Vec<KernelSource>,
}

impl KernelLibrary {
    pub fn new(kernels: Vec<KernelSource>) -> Self {
        Self { kernels }
    }

    /// The trace and post-process kernels shipped with the crate
    pub fn builtin() -> Self {
        Self::new(vec![
            KernelSource {
                name: TRACE_KERNEL,
                source: include_str!("../trace.wgsl"),
                entry_point: "main",
            },
            KernelSource {
                name: POST_PROCESS_KERNEL,
                source: include_str!("../post_process.wgsl"),
                entry_point: "main",
            },
        ])
    }

    pub fn get(&self, name: &str) -> Result<&KernelSource, InitError> {
        self.kernels
            .iter()
            .find(|kernel| kernel.name == name)
            .ok_or_else(|| InitError::KernelNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kernels.iter().map(|kernel| kernel.name)
    }
}

impl Default for KernelLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A compiled compute pipeline together with its binding table
pub struct ComputeKernel {
    name: &'static str,
    pipeline: ComputePipeline,
    layout: BindGroupLayout,
    table: &'static [Binding],
    shape: WorkgroupShape,
}

impl ComputeKernel {
    pub async fn build(
        gpu: &GpuContext,
        library: &KernelLibrary,
        name: &str,
        table: &'static [Binding],
        shape: WorkgroupShape,
        output_format: TextureFormat,
    ) -> Result<Self, InitError> {
        let kernel = library.get(name)?;
        let source = kernel.specialise(output_format)?;

        let (module, error) = gpu.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kernel.name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })
        .await;
        if let Some(error) = error {
            return Err(InitError::KernelCompilation {
                name: kernel.name.to_string(),
                message: error.to_string(),
            });
        }

        let ((layout, pipeline), error) = gpu.scoped(|device| {
            let layout = bindings::create_bind_group_layout(
                device,
                &format!("{} Bind Group Layout", kernel.name),
                table,
                output_format,
            );

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Pipeline Layout", kernel.name)),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });

            let constants = [
                ("group_width", shape.width as f64),
                ("group_height", shape.height as f64),
            ];
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(kernel.name),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: Some(kernel.entry_point),
                compilation_options: wgpu::PipelineCompilationOptions {
                    constants: &constants,
                    zero_initialize_workgroup_memory: true,
                },
                cache: None,
            });

            (layout, pipeline)
        })
        .await;
        if let Some(error) = error {
            return Err(InitError::Pipeline {
                name: kernel.name.to_string(),
                message: error.to_string(),
            });
        }

        log::debug!(
            "Kernel `{}` ready, work-group {}x{}",
            kernel.name,
            shape.width,
            shape.height
        );

        Ok(Self {
            name: kernel.name,
            pipeline,
            layout,
            table,
            shape,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> WorkgroupShape {
        self.shape
    }

    pub fn bind(&self, gpu: &GpuContext, resources: &DeviceResources) -> BindGroup {
        bindings::create_bind_group(
            gpu.device(),
            &format!("{} Bind Group", self.name),
            &self.layout,
            self.table,
            resources,
        )
    }

    /// Record one dispatch covering a `width` x `height` image
    pub fn dispatch(&self, encoder: &mut CommandEncoder, bind_group: &BindGroup, width: u32, height: u32) {
        let (groups_x, groups_y) = self.shape.group_count(width, height);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(self.name),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}

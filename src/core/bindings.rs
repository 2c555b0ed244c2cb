use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutEntry, BindingType, BufferBindingType, Device,
    ShaderStages, StorageTextureAccess, TextureFormat, TextureSampleType, TextureViewDimension,
};

use super::resources::{DeviceResources, ACCUMULATION_FORMAT};

/// Device-side objects a kernel can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceResource {
    SceneUniform,
    Spheres,
    Planes,
    Discs,
    Accumulation,
    Output,
}

/// How a kernel sees the resource bound at a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Uniform,
    ReadOnlyStorage,
    /// Sampled image, non-filterable float
    SampledImage,
    ReadWriteImage,
    WriteOnlyImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub slot: u32,
    pub resource: DeviceResource,
    pub kind: BindingKind,
}

const fn binding(slot: u32, resource: DeviceResource, kind: BindingKind) -> Binding {
    Binding { slot, resource, kind }
}

/// Inputs and outputs of the trace kernel, in slot order
pub const TRACE_BINDINGS: &[Binding] = &[
    binding(0, DeviceResource::SceneUniform, BindingKind::Uniform),
    binding(1, DeviceResource::Spheres, BindingKind::ReadOnlyStorage),
    binding(2, DeviceResource::Planes, BindingKind::ReadOnlyStorage),
    binding(3, DeviceResource::Discs, BindingKind::ReadOnlyStorage),
    binding(4, DeviceResource::Accumulation, BindingKind::ReadWriteImage),
];

/// Inputs and outputs of the post-process kernel, in slot order
pub const POST_PROCESS_BINDINGS: &[Binding] = &[
    binding(0, DeviceResource::Accumulation, BindingKind::SampledImage),
    binding(1, DeviceResource::Output, BindingKind::WriteOnlyImage),
];

impl Binding {
    /// Layout entry for this slot; `output_format` fills in the output image
    pub fn layout_entry(&self, output_format: TextureFormat) -> BindGroupLayoutEntry {
        let image_format = match self.resource {
            DeviceResource::Output => output_format,
            _ => ACCUMULATION_FORMAT,
        };

        let ty = match self.kind {
            BindingKind::Uniform => BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::ReadOnlyStorage => BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::SampledImage => BindingType::Texture {
                sample_type: TextureSampleType::Float { filterable: false },
                view_dimension: TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::ReadWriteImage => BindingType::StorageTexture {
                access: StorageTextureAccess::ReadWrite,
                format: image_format,
                view_dimension: TextureViewDimension::D2,
            },
            BindingKind::WriteOnlyImage => BindingType::StorageTexture {
                access: StorageTextureAccess::WriteOnly,
                format: image_format,
                view_dimension: TextureViewDimension::D2,
            },
        };

        BindGroupLayoutEntry {
            binding: self.slot,
            visibility: ShaderStages::COMPUTE,
            ty,
            count: None,
        }
    }
}

pub fn layout_entries(table: &[Binding], output_format: TextureFormat) -> Vec<BindGroupLayoutEntry> {
    table
        .iter()
        .map(|binding| binding.layout_entry(output_format))
        .collect()
}

pub fn create_bind_group_layout(
    device: &Device,
    label: &str,
    table: &[Binding],
    output_format: TextureFormat,
) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &layout_entries(table, output_format),
    })
}

/// Bind the current resources; must be redone after every resize
pub fn create_bind_group(
    device: &Device,
    label: &str,
    layout: &BindGroupLayout,
    table: &[Binding],
    resources: &DeviceResources,
) -> BindGroup {
    let entries: Vec<wgpu::BindGroupEntry> = table
        .iter()
        .map(|binding| wgpu::BindGroupEntry {
            binding: binding.slot,
            resource: resources.binding_resource(binding.resource),
        })
        .collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

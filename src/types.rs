use glam::{Mat4, Vec3};

/// Color written to the accumulation image when a ray hits nothing.
/// Must stay in sync with `BACKGROUND` in `trace.wgsl`.
pub const BACKGROUND_COLOR: [f32; 3] = [0.05, 0.06, 0.09];

/// Sphere primitive data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereData {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl SphereData {
    pub fn new(position: Vec3, radius: f32, color: [f32; 3]) -> Self {
        Self {
            position: position.to_array(),
            radius,
            color,
            _pad: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Infinite plane data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneData {
    pub point: [f32; 3],
    pub _pad1: f32,
    pub normal: [f32; 3],
    pub _pad2: f32,
    pub color: [f32; 3],
    pub _pad3: f32,
}

impl PlaneData {
    pub fn new(point: Vec3, normal: Vec3, color: [f32; 3]) -> Self {
        Self {
            point: point.to_array(),
            _pad1: 0.0,
            normal: normal.to_array(),
            _pad2: 0.0,
            color,
            _pad3: 0.0,
        }
    }

    pub fn point(&self) -> Vec3 {
        Vec3::from_array(self.point)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Disc primitive data for GPU (a plane clipped to a radius)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DiscData {
    pub point: [f32; 3],
    pub radius: f32,
    pub normal: [f32; 3],
    pub _pad1: f32,
    pub color: [f32; 3],
    pub _pad2: f32,
}

impl DiscData {
    pub fn new(point: Vec3, normal: Vec3, radius: f32, color: [f32; 3]) -> Self {
        Self {
            point: point.to_array(),
            radius,
            normal: normal.to_array(),
            _pad1: 0.0,
            color,
            _pad2: 0.0,
        }
    }

    pub fn point(&self) -> Vec3 {
        Vec3::from_array(self.point)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Camera block inside the scene uniform.
///
/// WGSL layout: `mat4x4<f32>` at 0, `vec3<f32>` at 64, three scalars at
/// 76/80/84, struct rounded up to 96 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraData {
    pub orientation: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub distance_to_plane: f32,
    pub height: f32,
    pub width: f32,
    pub _pad: [f32; 2],
}

impl CameraData {
    pub fn new(
        orientation: Mat4,
        position: Vec3,
        distance_to_plane: f32,
        height: f32,
        width: f32,
    ) -> Self {
        Self {
            orientation: orientation.to_cols_array_2d(),
            position: position.to_array(),
            distance_to_plane,
            height,
            width,
            _pad: [0.0; 2],
        }
    }
}

/// Per-frame uniform record pushed to the device
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub camera: CameraData,
    pub num_spheres: u32,
    pub num_planes: u32,
    pub num_discs: u32,
    pub frame_index: u32,
    pub did_change_camera: u32,
    pub _pad: [u32; 3],
}

impl SceneUniform {
    pub fn camera_changed(&self) -> bool {
        self.did_change_camera != 0
    }
}

const _: () = assert!(std::mem::size_of::<SphereData>() == 32);
const _: () = assert!(std::mem::size_of::<PlaneData>() == 48);
const _: () = assert!(std::mem::size_of::<DiscData>() == 48);
const _: () = assert!(std::mem::size_of::<CameraData>() == 96);
const _: () = assert!(std::mem::size_of::<SceneUniform>() == 128);

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_camera_layout_matches_wgsl() {
        assert_eq!(offset_of!(CameraData, orientation), 0);
        assert_eq!(offset_of!(CameraData, position), 64);
        assert_eq!(offset_of!(CameraData, distance_to_plane), 76);
        assert_eq!(offset_of!(CameraData, height), 80);
        assert_eq!(offset_of!(CameraData, width), 84);
    }

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        assert_eq!(offset_of!(SceneUniform, num_spheres), 96);
        assert_eq!(offset_of!(SceneUniform, num_planes), 100);
        assert_eq!(offset_of!(SceneUniform, num_discs), 104);
        assert_eq!(offset_of!(SceneUniform, frame_index), 108);
        assert_eq!(offset_of!(SceneUniform, did_change_camera), 112);
    }

    #[test]
    fn test_disc_radius_packed_after_point() {
        assert_eq!(offset_of!(DiscData, radius), 12);
        assert_eq!(offset_of!(DiscData, normal), 16);
        assert_eq!(offset_of!(DiscData, color), 32);
    }

    #[test]
    fn test_camera_data_columns() {
        let orientation = Mat4::from_cols(
            glam::Vec4::new(1.0, 0.0, 0.0, 0.0),
            glam::Vec4::new(0.0, 1.0, 0.0, 0.0),
            glam::Vec4::new(0.0, 0.0, -1.0, 0.0),
            glam::Vec4::W,
        );
        let data = CameraData::new(orientation, Vec3::new(0.0, 0.0, 5.0), 5.0, 2.0, 2.0);

        assert_eq!(data.orientation[2], [0.0, 0.0, -1.0, 0.0]);
        assert_eq!(data.position, [0.0, 0.0, 5.0]);
    }
}

use glam::Vec3;
use crate::camera::Camera;
use crate::types::{DiscData, PlaneData, SceneUniform, SphereData};

/// Complete scene: camera state plus the static primitive lists.
///
/// Primitives are fixed once the scene is built; only `camera`,
/// `frame_index` and `did_change_camera` change afterwards.
#[derive(Clone, Debug)]
pub struct Scene {
    pub camera: Camera,
    pub frame_index: u32,
    pub did_change_camera: bool,
    spheres: Vec<SphereData>,
    planes: Vec<PlaneData>,
    discs: Vec<DiscData>,
}

impl Scene {
    pub fn builder(camera: Camera) -> SceneBuilder {
        SceneBuilder::new(camera)
    }

    pub fn spheres(&self) -> &[SphereData] {
        &self.spheres
    }

    pub fn planes(&self) -> &[PlaneData] {
        &self.planes
    }

    pub fn discs(&self) -> &[DiscData] {
        &self.discs
    }

    /// Flat record for the device; counts always match the uploaded arrays
    pub fn uniform(&self) -> SceneUniform {
        SceneUniform {
            camera: self.camera.to_gpu(),
            num_spheres: self.spheres.len() as u32,
            num_planes: self.planes.len() as u32,
            num_discs: self.discs.len() as u32,
            frame_index: self.frame_index,
            did_change_camera: self.did_change_camera as u32,
            _pad: [0; 3],
        }
    }
}

/// Append-only scene construction
#[derive(Clone, Debug)]
pub struct SceneBuilder {
    camera: Camera,
    spheres: Vec<SphereData>,
    planes: Vec<PlaneData>,
    discs: Vec<DiscData>,
}

impl SceneBuilder {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            spheres: Vec::new(),
            planes: Vec::new(),
            discs: Vec::new(),
        }
    }

    pub fn sphere(mut self, position: Vec3, radius: f32, color: [f32; 3]) -> Self {
        self.spheres.push(SphereData::new(position, radius.max(0.0), clamp_color(color)));
        self
    }

    pub fn plane(mut self, point: Vec3, normal: Vec3, color: [f32; 3]) -> Self {
        self.planes.push(PlaneData::new(point, unit_normal(normal), clamp_color(color)));
        self
    }

    pub fn disc(mut self, point: Vec3, normal: Vec3, radius: f32, color: [f32; 3]) -> Self {
        self.discs.push(DiscData::new(
            point,
            unit_normal(normal),
            radius.max(0.0),
            clamp_color(color),
        ));
        self
    }

    pub fn build(self) -> Scene {
        log::debug!(
            "Scene built: {} spheres, {} planes, {} discs",
            self.spheres.len(),
            self.planes.len(),
            self.discs.len()
        );

        Scene {
            camera: self.camera,
            frame_index: 0,
            did_change_camera: false,
            spheres: self.spheres,
            planes: self.planes,
            discs: self.discs,
        }
    }
}

fn clamp_color(color: [f32; 3]) -> [f32; 3] {
    color.map(|c| c.clamp(0.0, 1.0))
}

// Degenerate normals fall back to +Y
fn unit_normal(normal: Vec3) -> Vec3 {
    normal.try_normalize().unwrap_or(Vec3::Y)
}

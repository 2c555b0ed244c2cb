use glam::Vec3;
use crate::camera::Camera;
use crate::scene::Scene;

/// Unit sphere at the origin seen head-on from +Z through a 2x2 viewport
pub fn create_single_sphere_scene() -> Scene {
    let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 5.0, 2.0, 2.0);

    Scene::builder(camera)
        .sphere(Vec3::ZERO, 1.0, [1.0, 0.2, 0.2])
        .build()
}

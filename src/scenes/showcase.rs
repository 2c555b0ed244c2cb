use glam::Vec3;
use crate::camera::Camera;
use crate::scene::Scene;

/// Two large spheres over a ground plane, with a disc off to the side
pub fn create_showcase_scene() -> Scene {
    let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 5.0, 30.0, 30.0);

    Scene::builder(camera)
        .sphere(Vec3::new(0.0, 0.0, -3.0), 5.0, [0.9, 0.35, 0.3])
        .sphere(Vec3::new(5.0, 5.0, -10.0), 10.0, [0.3, 0.5, 0.9])
        .plane(Vec3::new(0.0, -5.0, 0.0), Vec3::Y, [0.6, 0.6, 0.55])
        .disc(Vec3::new(-12.0, 2.0, -8.0), Vec3::new(1.0, 0.0, 1.0), 4.0, [0.95, 0.8, 0.2])
        .build()
}

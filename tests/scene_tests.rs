use glam::Vec3;
use ray_viewer::camera::Camera;
use ray_viewer::math::trace_nearest;
use ray_viewer::scenes::{create_scene, create_single_sphere_scene, SCENE_NAMES};
use ray_viewer::Scene;

fn hit_at(scene: &Scene, x: u32, y: u32, width: u32, height: u32) -> bool {
    let ray = scene.camera.primary_ray(x, y, width, height);
    trace_nearest(&ray, scene.spheres(), scene.planes(), scene.discs()).is_some()
}

#[test]
fn test_single_sphere_reference_image() {
    let scene = create_single_sphere_scene();

    assert!(hit_at(&scene, 2, 2, 4, 4), "centre pixel should hit");
    assert!(hit_at(&scene, 1, 1, 4, 4));
    assert!(!hit_at(&scene, 0, 0, 4, 4), "corner should miss");
    assert!(!hit_at(&scene, 3, 3, 4, 4), "corner should miss");
    assert!(!hit_at(&scene, 0, 3, 4, 4));
    assert!(!hit_at(&scene, 3, 0, 4, 4));
}

#[test]
fn test_reference_hit_faces_camera() {
    let scene = create_single_sphere_scene();
    let ray = scene.camera.primary_ray(2, 2, 4, 4);
    let hit = trace_nearest(&ray, scene.spheres(), scene.planes(), scene.discs())
        .expect("centre ray hits the sphere");

    assert!(hit.t > 3.9 && hit.t < 4.1, "t = {}", hit.t);
    assert!(hit.normal.dot(ray.direction) < 0.0);
    assert_eq!(hit.color, scene.spheres()[0].color);
}

#[test]
fn test_presets_start_clean() {
    for name in SCENE_NAMES {
        let scene = create_scene(name).unwrap();
        assert_eq!(scene.frame_index, 0, "{}", name);
        assert!(!scene.did_change_camera, "{}", name);

        let uniform = scene.uniform();
        assert_eq!(uniform.num_spheres as usize, scene.spheres().len());
        assert_eq!(uniform.num_planes as usize, scene.planes().len());
        assert_eq!(uniform.num_discs as usize, scene.discs().len());
    }
}

#[test]
fn test_nearest_primitive_wins() {
    let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 1.0, 1.0, 1.0);
    let scene = Scene::builder(camera)
        .sphere(Vec3::new(0.0, 0.0, -10.0), 1.0, [0.0, 0.0, 1.0])
        .disc(Vec3::new(0.0, 0.0, 0.0), Vec3::Z, 0.5, [0.0, 1.0, 0.0])
        .plane(Vec3::new(0.0, 0.0, -20.0), Vec3::Z, [1.0, 0.0, 0.0])
        .build();

    let ray = scene.camera.primary_ray(0, 0, 1, 1);
    let hit = trace_nearest(&ray, scene.spheres(), scene.planes(), scene.discs()).unwrap();

    assert_eq!(hit.color, [0.0, 1.0, 0.0]);
    assert!((hit.t - 5.0).abs() < 1e-5);
}

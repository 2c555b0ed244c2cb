mod showcase;
mod single_sphere;

use crate::scene::Scene;

pub use showcase::create_showcase_scene;
pub use single_sphere::create_single_sphere_scene;

/// Scene names accepted by `--scene` / `SCENE`
pub const SCENE_NAMES: &[&str] = &["showcase", "single-sphere"];

pub fn create_scene(name: &str) -> Option<Scene> {
    match name {
        "showcase" => Some(create_showcase_scene()),
        "single-sphere" => Some(create_single_sphere_scene()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_scene_exists() {
        for name in SCENE_NAMES {
            assert!(create_scene(name).is_some(), "missing scene {}", name);
        }
    }

    #[test]
    fn test_unknown_scene() {
        assert!(create_scene("fractal").is_none());
    }

    #[test]
    fn test_showcase_contents() {
        let scene = create_showcase_scene();
        assert_eq!(scene.spheres().len(), 2);
        assert_eq!(scene.planes().len(), 1);
        assert_eq!(scene.discs().len(), 1);
    }
}

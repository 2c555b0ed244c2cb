use glam::Vec3;
use crate::types::{DiscData, PlaneData, SphereData};

const T_MIN: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest intersection found by [`trace_nearest`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub t: f32,
    pub normal: Vec3,
    pub color: [f32; 3],
}

pub fn intersect_sphere(ray: &Ray, sphere: &SphereData) -> Option<f32> {
    let oc = ray.origin - sphere.position();
    let a = ray.direction.dot(ray.direction);
    let half_b = oc.dot(ray.direction);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = (-half_b - sqrt_d) / a;
    if near > T_MIN {
        return Some(near);
    }
    let far = (-half_b + sqrt_d) / a;
    (far > T_MIN).then_some(far)
}

pub fn intersect_plane(ray: &Ray, point: Vec3, normal: Vec3) -> Option<f32> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < 1e-6 {
        return None;
    }

    let t = (point - ray.origin).dot(normal) / denom;
    (t > T_MIN).then_some(t)
}

pub fn intersect_disc(ray: &Ray, disc: &DiscData) -> Option<f32> {
    let t = intersect_plane(ray, disc.point(), disc.normal())?;
    let offset = ray.at(t) - disc.point();
    (offset.length_squared() <= disc.radius * disc.radius).then_some(t)
}

/// CPU reference for the trace kernel's closest-hit search
pub fn trace_nearest(
    ray: &Ray,
    spheres: &[SphereData],
    planes: &[PlaneData],
    discs: &[DiscData],
) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;
    let mut consider = |t: f32, normal: Vec3, color: [f32; 3]| {
        if nearest.map_or(true, |hit| t < hit.t) {
            nearest = Some(Hit { t, normal, color });
        }
    };

    for sphere in spheres {
        if let Some(t) = intersect_sphere(ray, sphere) {
            let normal = (ray.at(t) - sphere.position()).normalize();
            consider(t, normal, sphere.color);
        }
    }
    for plane in planes {
        if let Some(t) = intersect_plane(ray, plane.point(), plane.normal()) {
            consider(t, plane.normal(), plane.color);
        }
    }
    for disc in discs {
        if let Some(t) = intersect_disc(ray, disc) {
            consider(t, disc.normal(), disc.color);
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hit_from_outside() {
        let sphere = SphereData::new(Vec3::new(0.0, 0.0, -5.0), 1.0, [1.0, 0.0, 0.0]);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let t = intersect_sphere(&ray, &sphere).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_hit_from_inside_returns_exit() {
        let sphere = SphereData::new(Vec3::ZERO, 2.0, [1.0, 0.0, 0.0]);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let t = intersect_sphere(&ray, &sphere).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = SphereData::new(Vec3::new(0.0, 5.0, -5.0), 1.0, [1.0, 0.0, 0.0]);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(intersect_sphere(&ray, &sphere).is_none());
    }

    #[test]
    fn test_plane_parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(intersect_plane(&ray, Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_plane_behind_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(intersect_plane(&ray, Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_disc_clips_to_radius() {
        let disc = DiscData::new(Vec3::ZERO, Vec3::Y, 1.0, [0.0, 1.0, 0.0]);

        let inside = Ray::new(Vec3::new(0.5, 2.0, 0.0), Vec3::NEG_Y);
        let outside = Ray::new(Vec3::new(1.5, 2.0, 0.0), Vec3::NEG_Y);

        assert!((intersect_disc(&inside, &disc).unwrap() - 2.0).abs() < 1e-5);
        assert!(intersect_disc(&outside, &disc).is_none());
    }

    #[test]
    fn test_trace_nearest_picks_closest() {
        let spheres = [
            SphereData::new(Vec3::new(0.0, 0.0, -10.0), 1.0, [1.0, 0.0, 0.0]),
            SphereData::new(Vec3::new(0.0, 0.0, -4.0), 1.0, [0.0, 0.0, 1.0]),
        ];
        let planes = [PlaneData::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z, [0.5, 0.5, 0.5])];
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let hit = trace_nearest(&ray, &spheres, &planes, &[]).unwrap();
        assert_eq!(hit.color, [0.0, 0.0, 1.0]);
        assert!((hit.t - 3.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }
}

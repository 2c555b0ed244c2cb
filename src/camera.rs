use glam::{Mat4, Vec3, Vec4};
use crate::math::Ray;
use crate::types::CameraData;

/// Constant reference orientation: right +X, up +Y, forward -Z.
///
/// Every look update is rebuilt from this matrix, never from the live one.
pub const REFERENCE_ORIENTATION: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, -1.0, 0.0),
    Vec4::new(0.0, 0.0, 0.0, 1.0),
);

/// Pinhole camera looking through a rectangular viewport on an image plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Columns are the local right, up and forward axes.
    pub orientation: Mat4,
    pub distance_to_plane: f32,
    pub viewport_height: f32,
    pub viewport_width: f32,
}

impl Camera {
    /// Camera at `position` with the reference orientation
    pub fn new(position: Vec3, distance_to_plane: f32, viewport_height: f32, viewport_width: f32) -> Self {
        Self {
            position,
            orientation: REFERENCE_ORIENTATION,
            distance_to_plane,
            viewport_height,
            viewport_width,
        }
    }

    pub fn right(&self) -> Vec3 {
        self.orientation.x_axis.truncate()
    }

    pub fn up(&self) -> Vec3 {
        self.orientation.y_axis.truncate()
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation.z_axis.truncate()
    }

    /// Primary ray through the centre of pixel `(x, y)` of a `width` x `height` image.
    ///
    /// Mirrors the ray generation in `trace.wgsl` for the first (unjittered) sample.
    pub fn primary_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let u = (x as f32 + 0.5) / width as f32 - 0.5;
        let v = 0.5 - (y as f32 + 0.5) / height as f32;

        let target = self.position
            + self.forward() * self.distance_to_plane
            + self.right() * (u * self.viewport_width)
            + self.up() * (v * self.viewport_height);

        Ray::new(self.position, (target - self.position).normalize())
    }

    pub fn to_gpu(&self) -> CameraData {
        CameraData::new(
            self.orientation,
            self.position,
            self.distance_to_plane,
            self.viewport_height,
            self.viewport_width,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_axes() {
        let camera = Camera::new(Vec3::ZERO, 1.0, 2.0, 2.0);
        assert_eq!(camera.right(), Vec3::X);
        assert_eq!(camera.up(), Vec3::Y);
        assert_eq!(camera.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_center_pixel_ray_points_forward() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 5.0, 2.0, 2.0);
        // Odd resolution puts a pixel centre exactly on the optical axis
        let ray = camera.primary_ray(1, 1, 3, 3);

        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-6);
        assert_eq!(ray.origin, camera.position);
    }

    #[test]
    fn test_top_left_pixel_ray_goes_up_and_left() {
        let camera = Camera::new(Vec3::ZERO, 5.0, 2.0, 2.0);
        let ray = camera.primary_ray(0, 0, 4, 4);

        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn test_to_gpu_copies_fields() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 5.0, 30.0, 20.0);
        let data = camera.to_gpu();

        assert_eq!(data.position, [1.0, 2.0, 3.0]);
        assert_eq!(data.distance_to_plane, 5.0);
        assert_eq!(data.height, 30.0);
        assert_eq!(data.width, 20.0);
        assert_eq!(data.orientation, REFERENCE_ORIENTATION.to_cols_array_2d());
    }
}

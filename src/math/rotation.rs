use std::f32::consts::{PI, TAU};
use glam::{Mat3, Mat4, Vec3};

/// Wrap an angle into (-π, π].
///
/// Angles already in range are returned untouched so that repeated
/// accumulation stays bit-exact until it actually crosses the boundary.
pub fn wrap_angle(angle: f32) -> f32 {
    if angle > -PI && angle <= PI {
        return angle;
    }

    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Homogeneous rotation of `radians` about `axis` (normalised internally)
pub fn rotation(radians: f32, axis: Vec3) -> Mat4 {
    Mat4::from_axis_angle(axis.normalize(), radians)
}

/// Largest deviation of the upper 3x3 block from an orthonormal basis.
///
/// Zero for a perfect rotation/reflection; grows with shear or scale creep.
pub fn orthonormality_error(matrix: &Mat4) -> f32 {
    let basis = Mat3::from_mat4(*matrix);
    let columns = [basis.x_axis, basis.y_axis, basis.z_axis];

    let mut error = 0.0f32;
    for (i, a) in columns.iter().enumerate() {
        error = error.max((a.length() - 1.0).abs());
        for b in &columns[i + 1..] {
            error = error.max(a.dot(*b).abs());
        }
    }
    error
}

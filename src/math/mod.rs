mod ray;
mod rotation;

pub use ray::{intersect_disc, intersect_plane, intersect_sphere, trace_nearest, Hit, Ray};
pub use rotation::{orthonormality_error, rotation, wrap_angle};

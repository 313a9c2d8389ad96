pub mod aabb;
pub mod polygon_3d;

pub use aabb::Aabb;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Finds a unit direction perpendicular to the given unit vector.
#[must_use]
pub fn perpendicular_dir(axis: &Vector3) -> Vector3 {
    let candidate = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let perp = axis.cross(&candidate);
    perp / perp.norm()
}

/// Rotates `v` about the unit `axis` by `angle` radians (Rodrigues).
#[must_use]
pub fn rotate_about(v: &Vector3, axis: &Vector3, angle: f64) -> Vector3 {
    let (s, c) = angle.sin_cos();
    v * c + axis.cross(v) * s + axis * (axis.dot(v) * (1.0 - c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn perpendicular_is_orthogonal_unit() {
        let axes = [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            Vector3::new(1.0, 2.0, 3.0).normalize(),
        ];
        for axis in axes {
            let perp = perpendicular_dir(&axis);
            assert!(perp.dot(&axis).abs() < 1e-12);
            assert!((perp.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rotate_x_about_z_quarter_turn() {
        let r = rotate_about(&Vector3::x(), &Vector3::z(), FRAC_PI_2);
        assert!((r - Vector3::y()).norm() < 1e-12);
    }
}

use crate::error::{OperationError, Result};
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

use super::{GeneralTransform, Transformable};

/// Rotates a mesh or solid around an axis.
pub struct Rotate {
    axis_origin: Point3,
    axis_direction: Vector3,
    angle: f64,
}

impl Rotate {
    /// Creates a new `Rotate` operation.
    ///
    /// * `angle` - Rotation angle in radians.
    #[must_use]
    pub fn new(axis_origin: Point3, axis_direction: Vector3, angle: f64) -> Self {
        Self {
            axis_origin,
            axis_direction,
            angle,
        }
    }

    /// Rotation about the Z axis through the origin.
    #[must_use]
    pub fn about_z(angle: f64) -> Self {
        Self::new(Point3::origin(), Vector3::z(), angle)
    }

    /// Executes the rotation, modifying the target in-place.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis direction is zero-length.
    pub fn execute<T: Transformable + ?Sized>(&self, target: &mut T) -> Result<()> {
        GeneralTransform::new(self.matrix()?).execute(target)
    }

    /// The homogeneous rotation matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis direction is zero-length.
    pub fn matrix(&self) -> Result<Matrix4> {
        let len = self.axis_direction.norm();
        if len < TOLERANCE {
            return Err(
                OperationError::InvalidInput("rotation axis must be non-zero".into()).into(),
            );
        }
        let axis = self.axis_direction / len;

        // Translate to origin, rotate, translate back
        let t_neg = Matrix4::new_translation(&(-self.axis_origin.coords));
        let rot = rotation_matrix(&axis, self.angle);
        let t_pos = Matrix4::new_translation(&self.axis_origin.coords);
        Ok(t_pos * rot * t_neg)
    }
}

/// Builds a 4x4 rotation matrix around a unit axis by an angle (Rodrigues).
#[allow(clippy::many_single_char_names)]
fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix4 {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[allow(clippy::suspicious_operation_groupings)]
    Matrix4::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
        0.0,               0.0,               0.0,               1.0,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::mesh::tests::tetrahedron;
    use crate::mesh::Solid;

    #[test]
    fn rotate_90_around_z() {
        let mut mesh = tetrahedron();
        Rotate::about_z(FRAC_PI_2).execute(&mut mesh).unwrap();
        // (1, 0, 0) -> (0, 1, 0), (0, 1, 0) -> (-1, 0, 0)
        assert!((mesh.vertices[1] - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
        assert!((mesh.vertices[2] - Point3::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
        assert_eq!(mesh.vertices[3], Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn rotation_about_offset_axis_keeps_axis_points() {
        let mut solid = Solid::new(tetrahedron()).unwrap();
        Rotate::new(Point3::new(1.0, 0.0, 0.0), Vector3::y(), 1.0)
            .execute(&mut solid)
            .unwrap();
        assert!((solid.mesh().vertices[1] - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((solid.volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn zero_axis_returns_error() {
        let mut mesh = tetrahedron();
        let result = Rotate::new(Point3::origin(), Vector3::zeros(), 1.0)
            .execute(&mut mesh);
        assert!(result.is_err());
    }
}

use crate::error::Result;
use crate::math::{Matrix4, Point3};

use super::Transformable;

/// Applies an arbitrary 4x4 transformation matrix to a mesh or solid.
pub struct GeneralTransform {
    matrix: Matrix4,
}

impl GeneralTransform {
    /// Creates a new `GeneralTransform` operation.
    #[must_use]
    pub fn new(matrix: Matrix4) -> Self {
        Self { matrix }
    }

    /// Executes the transformation, modifying the target in-place.
    ///
    /// Every vertex is mapped through the matrix in homogeneous
    /// coordinates; connectivity is untouched. A [`crate::mesh::Solid`]
    /// re-orients itself if the matrix mirrors it.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` matches the other operations.
    pub fn execute<T: Transformable + ?Sized>(&self, target: &mut T) -> Result<()> {
        let matrix = self.matrix;
        target.map_points(&move |p: &Point3| transform_point(&matrix, p));
        Ok(())
    }
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::mesh::tests::tetrahedron;
    use crate::mesh::Solid;

    #[test]
    fn identity_transform_preserves_vertices() {
        let mut mesh = tetrahedron();
        let before = mesh.vertices.clone();
        GeneralTransform::new(Matrix4::identity()).execute(&mut mesh).unwrap();
        assert_eq!(mesh.vertices, before);
    }

    #[test]
    fn translation_moves_every_vertex() {
        let mut mesh = tetrahedron();
        let shift = Vector3::new(1.0, -2.0, 3.0);
        GeneralTransform::new(Matrix4::new_translation(&shift))
            .execute(&mut mesh)
            .unwrap();
        assert_eq!(mesh.vertices[0], Point3::new(1.0, -2.0, 3.0));
        assert!((mesh.signed_volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn mirrored_solid_stays_outward() {
        let mut solid = Solid::new(tetrahedron()).unwrap();
        let mirror = Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0));
        GeneralTransform::new(mirror).execute(&mut solid).unwrap();
        assert!((solid.volume() - 1.0 / 6.0).abs() < 1e-12);
    }
}

use crate::error::{MeshError, Result};
use crate::math::Aabb;
use crate::mesh::SurfaceMesh;

/// Computes the axis-aligned bounding box of a mesh.
pub struct BoundingBox<'a> {
    mesh: &'a SurfaceMesh,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(mesh: &'a SurfaceMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] if the mesh has no vertices.
    pub fn execute(&self) -> Result<Aabb> {
        Ok(self.mesh.bounding_box().ok_or(MeshError::Empty)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;

    #[test]
    fn box_bounds() {
        let solid = MakeBox::new(Point3::new(-1.0, 2.0, 0.0), Point3::new(3.0, 5.0, 1.0))
            .execute()
            .unwrap();
        let bb = BoundingBox::new(solid.mesh()).execute().unwrap();
        assert_eq!(bb.min, Point3::new(-1.0, 2.0, 0.0));
        assert_eq!(bb.max, Point3::new(3.0, 5.0, 1.0));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(BoundingBox::new(&SurfaceMesh::new()).execute().is_err());
    }
}

use crate::error::{MeshError, Result};
use crate::mesh::SurfaceMesh;

/// Computes the volume enclosed by a closed triangle mesh.
///
/// Uses the signed tetrahedron method: for each triangle, computes
/// `(1/6) * v0 . (v1 x v2)` and sums over all triangles. The mesh must be
/// closed; the absolute value is returned, so winding only has to be
/// consistent, not outward.
pub struct Volume<'a> {
    mesh: &'a SurfaceMesh,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(mesh: &'a SurfaceMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the volume (absolute value).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] for a mesh without triangles and
    /// [`MeshError::NotClosed`] if the mesh has boundary edges.
    pub fn execute(&self) -> Result<f64> {
        if self.mesh.is_empty() {
            return Err(MeshError::Empty.into());
        }
        let open = self.mesh.boundary_edges().len();
        if open > 0 {
            return Err(MeshError::NotClosed(open).into());
        }
        Ok(self.mesh.signed_volume().abs())
    }
}

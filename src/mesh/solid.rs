use tracing::debug;

use crate::error::MeshError;
use crate::math::{Aabb, Point3};

use super::SurfaceMesh;

/// A closed triangle mesh whose triangles face outward.
///
/// The constructor checks closedness and flips an inward-facing mesh, so
/// the volume of a `Solid` is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    mesh: SurfaceMesh,
}

impl Solid {
    /// Wraps a closed mesh, orienting it outward.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Empty`] for a mesh without triangles,
    /// [`MeshError::NotClosed`] if any edge lacks an opposite edge, and
    /// [`MeshError::NonManifold`] if the enclosed volume is zero.
    pub fn new(mut mesh: SurfaceMesh) -> Result<Self, MeshError> {
        if mesh.is_empty() {
            return Err(MeshError::Empty);
        }
        let open = mesh.boundary_edges().len();
        if open > 0 {
            return Err(MeshError::NotClosed(open));
        }
        let volume = mesh.signed_volume();
        if volume.abs() <= f64::EPSILON {
            return Err(MeshError::NonManifold("closed mesh encloses no volume".into()));
        }
        if volume < 0.0 {
            debug!("flipping inward-facing mesh");
            mesh.flip_orientation();
        }
        Ok(Self { mesh })
    }

    /// Returns the underlying mesh.
    #[must_use]
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Consumes the solid, returning its mesh.
    #[must_use]
    pub fn into_mesh(self) -> SurfaceMesh {
        self.mesh
    }

    /// Moves every vertex through `f`, re-orienting the triangles if the
    /// map mirrored the solid.
    pub fn map_points(&mut self, f: impl Fn(&Point3) -> Point3) {
        for p in &mut self.mesh.vertices {
            *p = f(p);
        }
        if self.mesh.signed_volume() < 0.0 {
            self.mesh.flip_orientation();
        }
    }

    /// Enclosed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.mesh.signed_volume()
    }

    /// Bounding box of the solid.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.mesh.bounding_box()
    }
}

/// An ordered collection of solids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    solids: Vec<Solid>,
}

impl Compound {
    /// Creates an empty compound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a solid.
    pub fn push(&mut self, solid: Solid) {
        self.solids.push(solid);
    }

    /// The member solids in insertion order.
    #[must_use]
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    /// Number of member solids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// Returns `true` if the compound has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// All members merged into one mesh, without any boolean fusion.
    #[must_use]
    pub fn to_mesh(&self) -> SurfaceMesh {
        self.solids.iter().fold(SurfaceMesh::new(), |mut acc, s| {
            acc.merge(s.mesh());
            acc
        })
    }
}

impl FromIterator<Solid> for Compound {
    fn from_iter<I: IntoIterator<Item = Solid>>(iter: I) -> Self {
        Self {
            solids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::tests::tetrahedron;

    #[test]
    fn inward_mesh_is_flipped() {
        let mut mesh = tetrahedron();
        mesh.flip_orientation();
        let solid = Solid::new(mesh).unwrap();
        assert!((solid.volume() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn open_mesh_rejected() {
        let mut mesh = tetrahedron();
        mesh.faces.pop();
        assert!(matches!(Solid::new(mesh), Err(MeshError::NotClosed(3))));
    }

    #[test]
    fn empty_mesh_rejected() {
        assert!(matches!(Solid::new(SurfaceMesh::new()), Err(MeshError::Empty)));
    }

    #[test]
    fn compound_merges_members() {
        let solid = Solid::new(tetrahedron()).unwrap();
        let compound: Compound = std::iter::repeat(solid).take(3).collect();
        assert_eq!(compound.len(), 3);
        let mesh = compound.to_mesh();
        assert_eq!(mesh.face_count(), 12);
        assert!((mesh.signed_volume() - 0.5).abs() < 1e-12);
    }
}

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use crate::error::{MeshError, OperationError, Result};
use crate::math::polygon_3d::centroid;
use crate::math::Point3;
use crate::mesh::{Polyhedron, VertexId};
use crate::tessellation::TriangulatePolygon;

/// Closes every hole of a polyhedron with new triangles.
///
/// Each border cycle is triangulated on its best-fit plane with a
/// constrained Delaunay triangulation. A hole whose projection folds over
/// itself gets a fan around a new centroid vertex instead. The new
/// triangles follow the border direction, so they face the same way as
/// the surrounding surface.
#[derive(Debug, Default)]
pub struct FillHoles;

impl FillHoles {
    /// Creates a new `FillHoles` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the repair, returning the number of holes filled.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge structure is inconsistent or the
    /// patched surface is not closed.
    pub fn execute(&self, poly: &mut Polyhedron) -> Result<usize> {
        let loops = poly.border_loops()?;
        if loops.is_empty() {
            debug!("no holes to fill");
            return Ok(0);
        }

        let index: HashMap<VertexId, usize> = poly
            .vertices()
            .enumerate()
            .map(|(i, (id, _))| (id, i))
            .collect();
        let (mut points, mut faces) = poly.to_indexed()?;

        for (hole, border) in loops.iter().enumerate() {
            let ring = border
                .iter()
                .map(|&h| -> Result<usize> {
                    let v = poly.origin(h)?;
                    Ok(index.get(&v).copied().ok_or(MeshError::EntityNotFound("vertex"))?)
                })
                .collect::<Result<Vec<usize>>>()?;
            let outline: Vec<Point3> = ring.iter().map(|&i| points[i]).collect();

            match TriangulatePolygon::new(&outline).execute() {
                Ok(triangles) => {
                    debug!(hole, vertices = ring.len(), "hole triangulated");
                    faces.extend(
                        triangles
                            .iter()
                            .map(|t| t.iter().map(|&k| ring[k]).collect::<Vec<usize>>()),
                    );
                }
                Err(e) => {
                    warn!(hole, "{e}; filling with a centroid fan");
                    points.push(centroid(&outline));
                    faces.extend(fan(&ring, points.len() - 1));
                }
            }
        }

        let patched = Polyhedron::from_faces(&points, &faces)?;
        let open = patched.border_halfedge_count();
        if open > 0 {
            error!(open, "hole filling left open edges");
            return Err(OperationError::Failed(format!(
                "hole filling not done: {open} border edges remain"
            ))
            .into());
        }
        *poly = patched;
        info!(holes = loops.len(), "holes filled");
        Ok(loops.len())
    }
}

/// Triangles joining each border edge to the `center` vertex, wound like
/// the ring.
fn fan(ring: &[usize], center: usize) -> impl Iterator<Item = Vec<usize>> + '_ {
    (0..ring.len()).map(move |k| vec![ring[k], ring[(k + 1) % ring.len()], center])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::SurfaceMesh;
    use crate::operations::creation::MakeBox;

    /// 2 x 3 x 4 box with some of its twelve triangles removed.
    fn box_without(skip: &[usize]) -> SurfaceMesh {
        let mut mesh = MakeBox::from_size(2.0, 3.0, 4.0).execute().unwrap().into_mesh();
        let faces = mesh
            .faces
            .iter()
            .enumerate()
            .filter(|(i, _)| !skip.contains(i))
            .map(|(_, f)| *f)
            .collect();
        mesh.faces = faces;
        mesh
    }

    #[test]
    fn open_box_is_closed_and_volume_restored() {
        let mut poly = Polyhedron::from_surface_mesh(&box_without(&[2, 3])).unwrap();
        assert!(!poly.is_closed());
        let filled = FillHoles::new().execute(&mut poly).unwrap();
        assert_eq!(filled, 1);
        assert!(poly.is_closed());
        let mesh = poly.to_surface_mesh().unwrap();
        assert_eq!(mesh.face_count(), 12);
        assert!((mesh.signed_volume() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn two_holes_are_both_filled() {
        let mut poly = Polyhedron::from_surface_mesh(&box_without(&[0, 1, 2, 3])).unwrap();
        assert_eq!(poly.border_loops().unwrap().len(), 2);
        assert_eq!(FillHoles::new().execute(&mut poly).unwrap(), 2);
        assert!(poly.is_closed());
        let mesh = poly.to_surface_mesh().unwrap();
        assert!((mesh.signed_volume() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn closed_mesh_is_untouched() {
        let mut poly = Polyhedron::from_surface_mesh(&box_without(&[])).unwrap();
        assert_eq!(FillHoles::new().execute(&mut poly).unwrap(), 0);
        assert_eq!(poly.face_count(), 12);
    }

    #[test]
    fn fan_follows_ring_order() {
        let tris: Vec<_> = fan(&[4, 7, 9], 10).collect();
        assert_eq!(tris, vec![vec![4, 7, 10], vec![7, 9, 10], vec![9, 4, 10]]);
    }
}

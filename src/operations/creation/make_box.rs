use tracing::info;

use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::mesh::{Solid, SurfaceMesh};

/// Triangles of the unit cube, two per side, outward-facing. Vertex `i`
/// sits at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
const BOX_TRIANGLES: [[u32; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

/// Creates an axis-aligned box solid from two opposite corners.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation. The corners may be given in any
    /// order.
    #[must_use]
    pub fn new(corner_a: Point3, corner_b: Point3) -> Self {
        Self {
            min_corner: corner_a.inf(&corner_b),
            max_corner: corner_a.sup(&corner_b),
        }
    }

    /// Box with one corner at the origin and the given extents.
    #[must_use]
    pub fn from_size(dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(Point3::origin(), Point3::new(dx, dy, dz))
    }

    /// Executes the operation, returning the box as a closed solid.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the box is flat along
    /// any axis or a coordinate is not finite.
    pub fn execute(&self) -> Result<Solid> {
        let extent = self.max_corner - self.min_corner;
        if !extent.iter().all(|e| e.is_finite() && *e > TOLERANCE) {
            return Err(OperationError::InvalidInput(format!(
                "box extents must be positive, got {} x {} x {}",
                extent.x, extent.y, extent.z
            ))
            .into());
        }

        let (lo, hi) = (self.min_corner, self.max_corner);
        let vertices = (0..8)
            .map(|i| {
                Point3::new(
                    if i & 1 == 0 { lo.x } else { hi.x },
                    if i & 2 == 0 { lo.y } else { hi.y },
                    if i & 4 == 0 { lo.z } else { hi.z },
                )
            })
            .collect();
        let mesh = SurfaceMesh::from_parts(vertices, BOX_TRIANGLES.to_vec())?;
        let solid = Solid::new(mesh)?;
        info!(dx = extent.x, dy = extent.y, dz = extent.z, "box created");
        Ok(solid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn box_volume_and_closure() {
        let solid = MakeBox::new(Point3::origin(), Point3::new(2.0, 3.0, 4.0))
            .execute()
            .unwrap();
        assert!((solid.volume() - 24.0).abs() < 1e-12);
        assert!(solid.mesh().is_closed());
        assert_eq!(solid.mesh().face_count(), 12);
    }

    #[test]
    fn box_triangles_face_outward() {
        let solid = MakeBox::from_size(1.0, 1.0, 1.0).execute().unwrap();
        let mesh = solid.mesh();
        let center = Point3::new(0.5, 0.5, 0.5);
        for f in 0..mesh.face_count() {
            let n = mesh.face_normal(f).unwrap();
            assert!(n.dot(&(mesh.face_centroid(f) - center)) > 0.0, "face {f}");
        }
    }

    #[test]
    fn swapped_corners_are_normalized() {
        let solid = MakeBox::new(Point3::new(1.0, 1.0, 1.0), Point3::new(-1.0, 0.0, 0.0))
            .execute()
            .unwrap();
        let bb = solid.bounding_box().unwrap();
        assert_eq!(bb.min, Point3::new(-1.0, 0.0, 0.0));
        assert!((solid.volume() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn flat_box_rejected() {
        assert!(MakeBox::from_size(1.0, 0.0, 1.0).execute().is_err());
    }
}

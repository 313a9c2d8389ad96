use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{OperationError, Result};
use crate::math::polygon_3d::{
    is_simple_polygon_2d, newell_normal, project_to_plane, signed_area_2d,
};
use crate::math::{Point2, Point3};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates a closed 3D polygon without adding vertices.
///
/// The polygon is projected onto its best-fit (Newell) plane and
/// triangulated there with a constrained Delaunay triangulation. The
/// resulting triangles index into the input and are wound in the same
/// direction as the input loop.
pub struct TriangulatePolygon<'a> {
    points: &'a [Point3],
}

impl<'a> TriangulatePolygon<'a> {
    /// Creates a new `TriangulatePolygon` operation.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self { points }
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Failed`] if the polygon has fewer than
    /// three vertices, no well-defined plane, a self-intersecting
    /// projection, or if the triangulation does not cover it exactly.
    pub fn execute(&self) -> Result<Vec<[usize; 3]>> {
        let n = self.points.len();
        if n < 3 {
            return Err(failed("polygon needs at least 3 vertices"));
        }
        if n == 3 {
            return Ok(vec![[0, 1, 2]]);
        }
        let normal = newell_normal(self.points).ok_or_else(|| failed("polygon has no plane"))?;
        let projected = project_to_plane(self.points, &normal);
        if !is_simple_polygon_2d(&projected) {
            return Err(failed("projected polygon is not simple"));
        }

        let mut cdt = Cdt::new();
        let handles = insert_constraint_loop(&mut cdt, &projected)?;
        let index: HashMap<usize, usize> = handles
            .iter()
            .enumerate()
            .map(|(i, h)| (h.index(), i))
            .collect();
        if index.len() != n {
            return Err(failed("polygon vertices coincide after projection"));
        }

        let interior = classify_interior_faces(&cdt);
        let reverse = signed_area_2d(&projected) < 0.0;
        let mut triangles = Vec::with_capacity(n - 2);
        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let mut tri = [0; 3];
            for (slot, v) in tri.iter_mut().zip(face.vertices()) {
                *slot = *index
                    .get(&v.fix().index())
                    .ok_or_else(|| failed("triangulation inserted a vertex"))?;
            }
            // CDT faces are counter-clockwise in the plane.
            if reverse {
                tri.swap(1, 2);
            }
            triangles.push(tri);
        }

        if triangles.len() != n - 2 {
            return Err(failed(&format!(
                "expected {} triangles, got {}",
                n - 2,
                triangles.len()
            )));
        }
        Ok(triangles)
    }
}

fn failed(reason: &str) -> crate::error::SweepkitError {
    OperationError::Failed(format!("triangulation not done: {reason}")).into()
}

/// Inserts a closed polygon as constraint edges into the CDT, returning the
/// vertex handle of each polygon vertex.
fn insert_constraint_loop(
    cdt: &mut Cdt,
    points: &[Point2],
) -> Result<Vec<spade::handles::FixedVertexHandle>> {
    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| failed(&format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(handles)
}

/// Classifies which inner faces of the CDT are inside the polygon by
/// flood-filling from the outer face; crossing a constraint edge toggles
/// inside/outside.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn winding_normal(points: &[Point3], tri: [usize; 3]) -> Vector3 {
        let [a, b, c] = tri.map(|i| points[i]);
        (b - a).cross(&(c - a))
    }

    #[test]
    fn square_gives_two_triangles_with_loop_winding() {
        let pts = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let tris = TriangulatePolygon::new(&pts).execute().unwrap();
        assert_eq!(tris.len(), 2);
        for tri in tris {
            assert!(winding_normal(&pts, tri).z > 0.0);
        }
    }

    #[test]
    fn clockwise_loop_keeps_its_winding() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let tris = TriangulatePolygon::new(&pts).execute().unwrap();
        for tri in tris {
            assert!(winding_normal(&pts, tri).z < 0.0);
        }
    }

    #[test]
    fn concave_polygon_stays_inside() {
        // L-shape in the XZ plane.
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let tris = TriangulatePolygon::new(&pts).execute().unwrap();
        assert_eq!(tris.len(), 4);
        let area: f64 = tris.iter().map(|&t| winding_normal(&pts, t).norm() / 2.0).sum();
        assert!((area - 3.0).abs() < 1e-12);
    }

    #[test]
    fn self_intersecting_loop_rejected() {
        let pts = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(TriangulatePolygon::new(&pts).execute().is_err());
    }
}

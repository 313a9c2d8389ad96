//! Triangle mesh representations.
//!
//! ```text
//! SurfaceMesh   indexed vertices + triangles (+ optional vertex colours)
//! Solid         closed, outward-oriented SurfaceMesh
//! Compound      ordered collection of solids
//! Polyhedron    half-edge arena with explicit border half-edges
//! TriangleBvh   ray queries against a SurfaceMesh
//! ```

mod bvh;
mod polyhedron;
mod solid;

pub use bvh::{Ray, RayHit, TriangleBvh};
pub use polyhedron::{FaceData, FaceId, HalfedgeData, HalfedgeId, Polyhedron, VertexData, VertexId};
pub use solid::{Compound, Solid};

use std::collections::{HashMap, HashSet};

use crate::error::MeshError;
use crate::math::{Aabb, Point3, Vector3, TOLERANCE};

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// An indexed triangle mesh.
///
/// Triangles keep the vertex order they were built with; normals, volume
/// and exported facets all follow that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle vertex indices.
    pub faces: Vec<[u32; 3]>,
    /// Optional per-vertex colours, one per vertex when present.
    pub colors: Option<Vec<Rgb>>,
}

impl SurfaceMesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh from vertices and triangles, checking every index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfRange`] for a dangling index.
    pub fn from_parts(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        let count = vertices.len();
        for (face, tri) in faces.iter().enumerate() {
            for &index in tri {
                if index as usize >= count {
                    return Err(MeshError::IndexOutOfRange {
                        face,
                        index: index as usize,
                        count,
                    });
                }
            }
        }
        Ok(Self {
            vertices,
            faces,
            colors: None,
        })
    }

    /// Appends a vertex and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_vertex(&mut self, point: Point3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(point);
        if let Some(colors) = &mut self.colors {
            colors.push(Rgb::WHITE);
        }
        index
    }

    /// Appends a triangle.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.faces.push([a, b, c]);
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Corner positions of triangle `face` in stored order.
    #[must_use]
    pub fn triangle(&self, face: usize) -> [Point3; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit normal of triangle `face` by the right-hand rule, or `None` for
    /// a degenerate triangle.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vector3> {
        triangle_normal(&self.triangle(face))
    }

    /// Centroid of triangle `face`.
    #[must_use]
    pub fn face_centroid(&self, face: usize) -> Point3 {
        let [a, b, c] = self.triangle(face);
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// Appends another mesh, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &SurfaceMesh) {
        let offset = self.vertices.len() as u32;
        match (&mut self.colors, &other.colors) {
            (Some(mine), Some(theirs)) => mine.extend_from_slice(theirs),
            (Some(mine), None) => {
                mine.extend(std::iter::repeat(Rgb::WHITE).take(other.vertices.len()));
            }
            (None, Some(theirs)) => {
                let mut colors = vec![Rgb::WHITE; self.vertices.len()];
                colors.extend_from_slice(theirs);
                self.colors = Some(colors);
            }
            (None, None) => {}
        }
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Reverses the winding of every triangle.
    pub fn flip_orientation(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Signed enclosed volume by the divergence theorem.
    ///
    /// Sums `(1/6) * v0 . (v1 x v2)` over all triangles; positive when the
    /// triangles of a closed mesh face outward.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|&[a, b, c]| {
                let v0 = self.vertices[a as usize].coords;
                let v1 = self.vertices[b as usize].coords;
                let v2 = self.vertices[c as usize].coords;
                v0.dot(&v1.cross(&v2))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Total surface area.
    #[must_use]
    pub fn area(&self) -> f64 {
        (0..self.faces.len())
            .map(|f| {
                let [a, b, c] = self.triangle(f);
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .sum()
    }

    /// Bounding box of the vertices, or `None` for a mesh without vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Directed triangle edges whose opposite edge is missing.
    ///
    /// A closed, consistently oriented mesh has none.
    #[must_use]
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let directed: HashSet<(u32, u32)> = self.directed_edges().collect();
        self.directed_edges()
            .filter(|&(a, b)| !directed.contains(&(b, a)))
            .collect()
    }

    /// Returns `true` if every edge has a matching opposite edge.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.boundary_edges().is_empty()
    }

    /// For each triangle, the triangles sharing one of its edges.
    #[must_use]
    pub fn face_adjacency(&self) -> Vec<Vec<usize>> {
        let mut by_edge: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (f, &[a, b, c]) in self.faces.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                by_edge.entry((u.min(v), u.max(v))).or_default().push(f);
            }
        }
        let mut adjacency = vec![Vec::new(); self.faces.len()];
        for faces in by_edge.values() {
            for &f in faces {
                for &g in faces {
                    if f != g && !adjacency[f].contains(&g) {
                        adjacency[f].push(g);
                    }
                }
            }
        }
        adjacency
    }

    fn directed_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.faces
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
    }
}

/// Unit normal of a triangle by the right-hand rule over its corner order.
#[must_use]
pub fn triangle_normal(tri: &[Point3; 3]) -> Option<Vector3> {
    let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
    let len = n.norm();
    (len > TOLERANCE).then(|| n / len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Unit tetrahedron with outward-facing triangles.
    pub(crate) fn tetrahedron() -> SurfaceMesh {
        SurfaceMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn tetrahedron_volume_and_closure() {
        let mesh = tetrahedron();
        assert!((mesh.signed_volume() - 1.0 / 6.0).abs() < 1e-12);
        assert!(mesh.is_closed());
    }

    #[test]
    fn flipping_negates_volume() {
        let mut mesh = tetrahedron();
        mesh.flip_orientation();
        assert!((mesh.signed_volume() + 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn removing_a_face_opens_three_edges() {
        let mut mesh = tetrahedron();
        mesh.faces.pop();
        assert!(!mesh.is_closed());
        assert_eq!(mesh.boundary_edges().len(), 3);
    }

    #[test]
    fn dangling_index_rejected() {
        let result = SurfaceMesh::from_parts(vec![Point3::origin()], vec![[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::IndexOutOfRange {
                face: 0,
                index: 1,
                count: 1
            })
        ));
    }

    #[test]
    fn merge_offsets_indices_and_fills_colors() {
        let mut a = tetrahedron();
        a.colors = Some(vec![Rgb::RED; 4]);
        let b = tetrahedron();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.faces[4], [4, 6, 5]);
        let colors = a.colors.as_ref().unwrap();
        assert_eq!(colors.len(), 8);
        assert_eq!(colors[7], Rgb::WHITE);
    }

    #[test]
    fn every_tetrahedron_face_has_three_neighbours() {
        let adjacency = tetrahedron().face_adjacency();
        assert!(adjacency.iter().all(|n| n.len() == 3));
    }

    #[test]
    fn face_normal_follows_right_hand_rule() {
        let mesh = tetrahedron();
        let n = mesh.face_normal(0).unwrap();
        assert!((n + Vector3::z()).norm() < 1e-12);
    }
}

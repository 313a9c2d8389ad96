use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use crate::error::MeshError;
use crate::math::Point3;

use super::SurfaceMesh;

slotmap::new_key_type! {
    /// Unique identifier for a polyhedron vertex.
    pub struct VertexId;
}

slotmap::new_key_type! {
    /// Unique identifier for a half-edge.
    pub struct HalfedgeId;
}

slotmap::new_key_type! {
    /// Unique identifier for a polyhedron face.
    pub struct FaceId;
}

/// Data associated with a vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// Position of the vertex.
    pub point: Point3,
    /// One outgoing half-edge, `None` for an isolated vertex.
    pub halfedge: Option<HalfedgeId>,
}

/// Data associated with a directed half-edge.
#[derive(Debug, Clone)]
pub struct HalfedgeData {
    /// Vertex the half-edge points to.
    pub target: VertexId,
    /// Oppositely directed partner.
    pub twin: HalfedgeId,
    /// Next half-edge around the face, or around the hole for a border
    /// half-edge.
    pub next: HalfedgeId,
    /// Incident face, `None` on a border.
    pub face: Option<FaceId>,
}

/// Data associated with a face.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// One half-edge on the face boundary.
    pub halfedge: HalfedgeId,
}

/// A half-edge polyhedral surface.
///
/// Every interior edge is a pair of twin half-edges bounding two faces.
/// Edges with a single face get an explicit border half-edge whose `face`
/// is `None`; following `next` from a border half-edge walks one hole.
///
/// Entities are only ever inserted, so arena iteration order is insertion
/// order and conversions are deterministic.
#[derive(Debug, Default, Clone)]
pub struct Polyhedron {
    vertices: SlotMap<VertexId, VertexData>,
    halfedges: SlotMap<HalfedgeId, HalfedgeData>,
    faces: SlotMap<FaceId, FaceData>,
}

impl Polyhedron {
    /// Creates a new, empty polyhedron.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a polyhedron from indexed polygons.
    ///
    /// Each face lists vertex indices counter-clockwise seen from outside.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfRange`] for a dangling index and
    /// [`MeshError::NonManifold`] if a face has fewer than three vertices,
    /// a directed edge is used twice, or a vertex lies on two holes.
    pub fn from_faces(points: &[Point3], faces: &[Vec<usize>]) -> Result<Self, MeshError> {
        let mut poly = Self::new();
        let ids: Vec<VertexId> = points
            .iter()
            .map(|&point| {
                poly.vertices.insert(VertexData {
                    point,
                    halfedge: None,
                })
            })
            .collect();

        let mut directed: HashMap<(usize, usize), HalfedgeId> = HashMap::new();
        // Insertion-ordered copy of `directed` for deterministic border creation.
        let mut edge_order: Vec<(usize, usize)> = Vec::new();

        for (f, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::NonManifold(format!(
                    "face {f} has only {} vertices",
                    face.len()
                )));
            }
            if let Some(&index) = face.iter().find(|&&i| i >= points.len()) {
                return Err(MeshError::IndexOutOfRange {
                    face: f,
                    index,
                    count: points.len(),
                });
            }

            let mut ring = Vec::with_capacity(face.len());
            for (k, &from) in face.iter().enumerate() {
                let to = face[(k + 1) % face.len()];
                if directed.contains_key(&(from, to)) {
                    return Err(MeshError::NonManifold(format!(
                        "edge {from}->{to} is used twice in the same direction"
                    )));
                }
                let h = poly.halfedges.insert(HalfedgeData {
                    target: ids[to],
                    twin: HalfedgeId::default(),
                    next: HalfedgeId::default(),
                    face: None,
                });
                directed.insert((from, to), h);
                edge_order.push((from, to));
                ring.push(h);
                let origin = &mut poly.vertices[ids[from]];
                origin.halfedge.get_or_insert(h);
            }

            let face_id = poly.faces.insert(FaceData { halfedge: ring[0] });
            for (k, &h) in ring.iter().enumerate() {
                let data = &mut poly.halfedges[h];
                data.next = ring[(k + 1) % ring.len()];
                data.face = Some(face_id);
            }
        }

        // Pair twins; unmatched edges get a border half-edge running the
        // other way, keyed by its origin vertex.
        let mut border_from: HashMap<usize, HalfedgeId> = HashMap::new();
        let mut borders: Vec<(HalfedgeId, usize)> = Vec::new();
        for &(from, to) in &edge_order {
            let h = directed[&(from, to)];
            if let Some(&twin) = directed.get(&(to, from)) {
                poly.halfedges[h].twin = twin;
                continue;
            }
            let border = poly.halfedges.insert(HalfedgeData {
                target: ids[from],
                twin: h,
                next: HalfedgeId::default(),
                face: None,
            });
            poly.halfedges[h].twin = border;
            if border_from.insert(to, border).is_some() {
                return Err(MeshError::NonManifold(format!(
                    "vertex {to} lies on more than one boundary"
                )));
            }
            borders.push((border, from));
        }

        for (border, target) in borders {
            let next = border_from.get(&target).copied().ok_or_else(|| {
                MeshError::NonManifold(format!("boundary through vertex {target} does not close"))
            })?;
            poly.halfedges[border].next = next;
        }

        Ok(poly)
    }

    /// Builds a polyhedron from a triangle mesh.
    ///
    /// # Errors
    ///
    /// See [`Polyhedron::from_faces`].
    pub fn from_surface_mesh(mesh: &SurfaceMesh) -> Result<Self, MeshError> {
        let faces: Vec<Vec<usize>> = mesh
            .faces
            .iter()
            .map(|tri| tri.iter().map(|&i| i as usize).collect())
            .collect();
        Self::from_faces(&mesh.vertices, &faces)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, MeshError> {
        self.vertices
            .get(id)
            .ok_or(MeshError::EntityNotFound("vertex"))
    }

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found.
    pub fn halfedge(&self, id: HalfedgeId) -> Result<&HalfedgeData, MeshError> {
        self.halfedges
            .get(id)
            .ok_or(MeshError::EntityNotFound("halfedge"))
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, MeshError> {
        self.faces.get(id).ok_or(MeshError::EntityNotFound("face"))
    }

    /// Vertex a half-edge starts from.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge or its twin is missing.
    pub fn origin(&self, id: HalfedgeId) -> Result<VertexId, MeshError> {
        let twin = self.halfedge(id)?.twin;
        Ok(self.halfedge(twin)?.target)
    }

    /// Vertices around a face, starting at the origin of its half-edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or one of its half-edges is missing.
    pub fn face_vertices(&self, id: FaceId) -> Result<Vec<VertexId>, MeshError> {
        let start = self.face(id)?.halfedge;
        self.cycle(start)?
            .into_iter()
            .map(|h| self.origin(h))
            .collect()
    }

    /// Iterates over all vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    /// Iterates mutably over all vertex positions.
    pub fn points_mut(&mut self) -> impl Iterator<Item = &mut Point3> {
        self.vertices.values_mut().map(|v| &mut v.point)
    }

    /// Iterates over all faces in insertion order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of half-edges, border half-edges included.
    #[must_use]
    pub fn halfedge_count(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of border half-edges.
    #[must_use]
    pub fn border_halfedge_count(&self) -> usize {
        self.halfedges.values().filter(|h| h.face.is_none()).count()
    }

    /// Returns `true` if the surface has faces and no border.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.faces.is_empty() && self.border_halfedge_count() == 0
    }

    /// Returns `true` if every face is a triangle.
    #[must_use]
    pub fn is_pure_triangle(&self) -> bool {
        self.faces
            .keys()
            .all(|f| self.face_vertices(f).is_ok_and(|v| v.len() == 3))
    }

    /// Every hole as the cycle of its border half-edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a border cycle is broken.
    pub fn border_loops(&self) -> Result<Vec<Vec<HalfedgeId>>, MeshError> {
        let mut seen = HashSet::new();
        let mut loops = Vec::new();
        for (id, data) in &self.halfedges {
            if data.face.is_some() || seen.contains(&id) {
                continue;
            }
            let cycle = self.cycle(id)?;
            seen.extend(cycle.iter().copied());
            loops.push(cycle);
        }
        Ok(loops)
    }

    /// Vertex positions and polygons by vertex index, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-edge structure is inconsistent.
    pub fn to_indexed(&self) -> Result<(Vec<Point3>, Vec<Vec<usize>>), MeshError> {
        let index: HashMap<VertexId, usize> = self
            .vertices
            .keys()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let points = self.vertices.values().map(|v| v.point).collect();
        let faces = self
            .faces
            .keys()
            .map(|f| -> Result<Vec<usize>, MeshError> {
                self.face_vertices(f)?
                    .iter()
                    .map(|v| index.get(v).copied().ok_or(MeshError::EntityNotFound("vertex")))
                    .collect()
            })
            .collect::<Result<_, MeshError>>()?;
        Ok((points, faces))
    }

    /// Converts to a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::NotTriangleMesh`] if a face is not a triangle.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_surface_mesh(&self) -> Result<SurfaceMesh, MeshError> {
        let (points, polygons) = self.to_indexed()?;
        let mut faces = Vec::with_capacity(polygons.len());
        for (face, polygon) in polygons.iter().enumerate() {
            let &[a, b, c] = polygon.as_slice() else {
                return Err(MeshError::NotTriangleMesh {
                    face,
                    arity: polygon.len(),
                });
            };
            faces.push([a as u32, b as u32, c as u32]);
        }
        SurfaceMesh::from_parts(points, faces)
    }

    /// Half-edges reached by following `next` from `start` until it returns.
    fn cycle(&self, start: HalfedgeId) -> Result<Vec<HalfedgeId>, MeshError> {
        let mut out = vec![start];
        let mut h = self.halfedge(start)?.next;
        while h != start {
            if out.len() > self.halfedges.len() {
                return Err(MeshError::NonManifold("half-edge cycle does not close".into()));
            }
            out.push(h);
            h = self.halfedge(h)?.next;
        }
        Ok(out)
    }
}

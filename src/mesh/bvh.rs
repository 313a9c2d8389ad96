//! Bounding volume hierarchy over the triangles of a [`SurfaceMesh`].
//!
//! Median split along the longest centroid axis; leaves hold a handful of
//! triangles. Only closest-hit queries are needed by the analysis passes.

use crate::math::{Aabb, Point3, Vector3};

use super::SurfaceMesh;

const LEAF_SIZE: usize = 4;
const HIT_EPSILON: f64 = 1e-9;

/// A ray with a unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Vector3,
    inv_direction: Vector3,
}

impl Ray {
    /// Creates a ray; the direction is normalized.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        let direction = direction.normalize();
        let inv_direction = direction.map(|c| 1.0 / c);
        Self {
            origin,
            direction,
            inv_direction,
        }
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Slab test. Returns the entry distance (clamped to zero) if the ray
    /// meets the box.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f64> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let t1 = (aabb.min[axis] - self.origin[axis]) * self.inv_direction[axis];
            let t2 = (aabb.max[axis] - self.origin[axis]) * self.inv_direction[axis];
            // NaN from 0 * inf (origin on a slab plane, axis-parallel ray)
            // is skipped by min/max.
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
        (t_max >= t_min && t_max >= 0.0).then_some(t_min.max(0.0))
    }

    /// Moller-Trumbore ray/triangle test, two-sided.
    #[must_use]
    pub fn intersect_triangle(&self, tri: &[Point3; 3]) -> Option<f64> {
        let e1 = tri[1] - tri[0];
        let e2 = tri[2] - tri[0];
        let p = self.direction.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < 1e-14 {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - tri[0];
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = self.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&q) * inv_det;
        (t > HIT_EPSILON).then_some(t)
    }
}

/// Closest intersection of a ray with a mesh triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray.
    pub t: f64,
    /// Index of the hit triangle.
    pub face: usize,
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        aabb: Aabb,
        faces: Vec<usize>,
    },
    Internal {
        aabb: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb {
        match self {
            Self::Leaf { aabb, .. } | Self::Internal { aabb, .. } => aabb,
        }
    }
}

/// Triangle BVH borrowing the mesh it was built from.
#[derive(Debug)]
pub struct TriangleBvh<'a> {
    mesh: &'a SurfaceMesh,
    root: Option<BvhNode>,
}

impl<'a> TriangleBvh<'a> {
    /// Builds the hierarchy over every triangle of `mesh`.
    #[must_use]
    pub fn build(mesh: &'a SurfaceMesh) -> Self {
        let mut items: Vec<(usize, Aabb, Point3)> = (0..mesh.face_count())
            .filter_map(|f| {
                let tri = mesh.triangle(f);
                Aabb::from_points(&tri).map(|aabb| (f, aabb, mesh.face_centroid(f)))
            })
            .collect();
        let root = (!items.is_empty()).then(|| build_node(&mut items));
        Self { mesh, root }
    }

    /// Closest hit along `ray`, ignoring triangle `skip` if given.
    #[must_use]
    pub fn trace_closest(&self, ray: &Ray, skip: Option<usize>) -> Option<RayHit> {
        let mut closest = None;
        if let Some(root) = &self.root {
            self.trace_node(ray, root, skip, &mut closest);
        }
        closest
    }

    fn trace_node(
        &self,
        ray: &Ray,
        node: &BvhNode,
        skip: Option<usize>,
        closest: &mut Option<RayHit>,
    ) {
        let Some(entry) = ray.intersect_aabb(node.aabb()) else {
            return;
        };
        if closest.is_some_and(|hit| entry >= hit.t) {
            return;
        }
        match node {
            BvhNode::Leaf { faces, .. } => {
                for &face in faces {
                    if Some(face) == skip {
                        continue;
                    }
                    if let Some(t) = ray.intersect_triangle(&self.mesh.triangle(face)) {
                        if closest.map_or(true, |hit| t < hit.t) {
                            *closest = Some(RayHit { t, face });
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let lt = ray.intersect_aabb(left.aabb()).unwrap_or(f64::INFINITY);
                let rt = ray.intersect_aabb(right.aabb()).unwrap_or(f64::INFINITY);
                let (near, far) = if lt <= rt { (left, right) } else { (right, left) };
                self.trace_node(ray, near, skip, closest);
                self.trace_node(ray, far, skip, closest);
            }
        }
    }
}

fn build_node(items: &mut [(usize, Aabb, Point3)]) -> BvhNode {
    let aabb = items[1..]
        .iter()
        .fold(items[0].1, |acc, (_, b, _)| acc.union(b));
    if items.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb,
            faces: items.iter().map(|(f, _, _)| *f).collect(),
        };
    }

    let first = Aabb {
        min: items[0].2,
        max: items[0].2,
    };
    let centroid_box = items[1..]
        .iter()
        .fold(first, |acc, (_, _, c)| acc.including(c));
    let axis = centroid_box.longest_axis();
    items.sort_by(|a, b| a.2[axis].total_cmp(&b.2[axis]));

    let mid = items.len() / 2;
    let (lo, hi) = items.split_at_mut(mid);
    BvhNode::Internal {
        aabb,
        left: Box::new(build_node(lo)),
        right: Box::new(build_node(hi)),
    }
}

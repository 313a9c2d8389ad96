mod general;
mod rotate;
mod scale;

pub use general::GeneralTransform;
pub use rotate::Rotate;
pub use scale::Scale;

use crate::math::Point3;
use crate::mesh::{Polyhedron, Solid, SurfaceMesh};

/// Geometry whose vertex positions can be moved in place.
pub trait Transformable {
    /// Replaces every vertex position `p` with `f(p)`.
    fn map_points(&mut self, f: &dyn Fn(&Point3) -> Point3);
}

impl Transformable for SurfaceMesh {
    fn map_points(&mut self, f: &dyn Fn(&Point3) -> Point3) {
        for p in &mut self.vertices {
            *p = f(p);
        }
    }
}

impl Transformable for Polyhedron {
    fn map_points(&mut self, f: &dyn Fn(&Point3) -> Point3) {
        for p in self.points_mut() {
            *p = f(p);
        }
    }
}

impl Transformable for Solid {
    fn map_points(&mut self, f: &dyn Fn(&Point3) -> Point3) {
        Solid::map_points(self, f);
    }
}

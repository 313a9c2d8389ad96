use tracing::error;

use crate::error::{OperationError, Result};
use crate::math::{Matrix4, Point3};

use super::{GeneralTransform, Transformable};

/// Scales a mesh, polyhedron or solid uniformly about a center point.
pub struct Scale {
    center: Point3,
    factor: f64,
}

impl Scale {
    /// Creates a new `Scale` operation about the origin.
    #[must_use]
    pub fn new(factor: f64) -> Self {
        Self {
            center: Point3::origin(),
            factor,
        }
    }

    /// Scales about `center` instead of the origin.
    #[must_use]
    pub fn about(mut self, center: Point3) -> Self {
        self.center = center;
        self
    }

    /// Executes the scaling, modifying the target in-place.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the factor is not
    /// finite and positive. A negative factor would turn the surface
    /// inside out.
    pub fn execute<T: Transformable + ?Sized>(&self, target: &mut T) -> Result<()> {
        if !(self.factor.is_finite() && self.factor > 0.0) {
            error!(factor = self.factor, "scale rejected");
            return Err(OperationError::InvalidInput(format!(
                "scale factor must be finite and positive, got {}",
                self.factor
            ))
            .into());
        }
        let c = self.center.coords;
        let matrix = Matrix4::new_translation(&c)
            * Matrix4::new_scaling(self.factor)
            * Matrix4::new_translation(&(-c));
        GeneralTransform::new(matrix).execute(target)
    }
}

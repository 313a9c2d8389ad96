use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{perpendicular_dir, Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A full circle, parameterized by angle over `[0, 2*pi)`.
///
/// `P(t) = center + radius * (cos(t) * u + sin(t) * v)` with `u` the
/// reference direction and `v = normal x u`. A pipe sweep uses the circle
/// as its cross-section, so `u` is also the profile's zero-angle seam.
#[derive(Debug, Clone)]
pub struct Circle {
    center: Point3,
    radius: f64,
    normal: Vector3,
    u: Vector3,
    v: Vector3,
}

impl Circle {
    /// Creates a circle around `normal` with its zero angle towards
    /// `ref_dir`. Any component of `ref_dir` along the normal is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a non-positive radius and
    /// [`GeometryError::ZeroVector`] if the normal is zero or `ref_dir` is
    /// parallel to it.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
    ) -> Result<Self> {
        if !(radius > TOLERANCE && radius.is_finite()) {
            return Err(GeometryError::Degenerate(format!(
                "circle radius {radius} is not positive"
            ))
            .into());
        }
        let normal = normal
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        let u = (ref_dir - normal * ref_dir.dot(&normal))
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        Ok(Self {
            center,
            radius,
            normal,
            u,
            v: normal.cross(&u),
        })
    }

    /// Circle in the plane normal to `axis` with an arbitrary seam.
    ///
    /// # Errors
    ///
    /// See [`Circle::new`].
    pub fn from_axis(center: Point3, axis: Vector3, radius: f64) -> Result<Self> {
        let normal = axis
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        Self::new(center, radius, normal, perpendicular_dir(&normal))
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit normal of the circle plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Unit direction of the point at `t = 0`.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.u
    }

    /// Unit direction of the point at `t = pi/2`.
    #[must_use]
    pub fn binormal(&self) -> &Vector3 {
        &self.v
    }
}

impl Curve for Circle {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let (sin, cos) = t.sin_cos();
        Ok(self.center + (self.u * cos + self.v * sin) * self.radius)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let (sin, cos) = t.sin_cos();
        Ok((self.v * cos - self.u * sin) * self.radius)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, TAU)
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn is_periodic(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_reaches_binormal() {
        let c = Circle::new(Point3::origin(), 3.0, Vector3::z(), Vector3::x()).unwrap();
        let p = c.evaluate(FRAC_PI_2).unwrap();
        assert!((p - Point3::new(0.0, 3.0, 0.0)).norm() < 1e-12);
        assert!((c.binormal() - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn tilted_ref_dir_is_projected() {
        let tilted = Vector3::new(1.0, 0.0, 1.0);
        let c = Circle::new(Point3::origin(), 1.0, Vector3::z(), tilted).unwrap();
        assert!((c.ref_dir() - Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn bad_inputs_rejected() {
        assert!(Circle::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
        assert!(Circle::new(Point3::origin(), 1.0, Vector3::zeros(), Vector3::x()).is_err());
        assert!(Circle::new(Point3::origin(), 1.0, Vector3::z(), Vector3::z()).is_err());
        assert!(Circle::from_axis(Point3::origin(), Vector3::zeros(), 1.0).is_err());
    }

    #[test]
    fn closed_and_periodic() {
        let c = Circle::from_axis(Point3::origin(), Vector3::x(), 1.0).unwrap();
        assert!(c.is_closed());
        assert!(c.is_periodic());
        let a = c.evaluate(0.0).unwrap();
        let b = c.evaluate(TAU).unwrap();
        assert!((a - b).norm() < 1e-12);
    }

    #[test]
    fn derivative_has_radius_magnitude() {
        let c = Circle::from_axis(Point3::origin(), Vector3::z(), 2.5).unwrap();
        let d = c.derivative(1.0).unwrap();
        assert!((d.norm() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn from_axis_lies_in_normal_plane() {
        let axis = Vector3::new(1.0, 1.0, 0.0);
        let c = Circle::from_axis(Point3::new(1.0, 2.0, 3.0), axis, 2.0).unwrap();
        let n = axis.normalize();
        for i in 0..8 {
            let t = f64::from(i) * TAU / 8.0;
            let d = c.evaluate(t).unwrap() - *c.center();
            assert!(d.dot(&n).abs() < 1e-12);
            assert!((d.norm() - c.radius()).abs() < 1e-12);
        }
        assert!((c.normal() - n).norm() < 1e-12);
    }
}

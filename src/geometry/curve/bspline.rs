use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// One period of a periodic knot sequence.
///
/// Stores `n + 1` strictly increasing knots `u_0 < ... < u_n`; the knot at
/// any integer index `j` is `u_(j mod n) + floor(j / n) * (u_n - u_0)`.
#[derive(Debug, Clone)]
pub(crate) struct PeriodicKnots {
    knots: Vec<f64>,
}

impl PeriodicKnots {
    /// Wraps a knot period, checking that it is strictly increasing.
    pub(crate) fn new(knots: Vec<f64>) -> Result<Self> {
        if knots.len() < 2 {
            return Err(
                GeometryError::Degenerate("knot period needs at least two knots".into()).into(),
            );
        }
        if knots.windows(2).any(|w| w[1] - w[0] <= TOLERANCE) {
            return Err(
                GeometryError::Degenerate("knots must be strictly increasing".into()).into(),
            );
        }
        Ok(Self { knots })
    }

    /// Number of spans in one period.
    pub(crate) fn span_count(&self) -> usize {
        self.knots.len() - 1
    }

    pub(crate) fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.knots[0], self.knots[self.knots.len() - 1])
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn knot(&self, j: isize) -> f64 {
        let n = self.span_count() as isize;
        let period = self.domain().span();
        let idx = j.rem_euclid(n);
        let wraps = j.div_euclid(n);
        self.knots[idx as usize] + wraps as f64 * period
    }

    /// Index `i` of the span `[u_i, u_(i+1))` containing `t`, which must
    /// already lie inside one period.
    pub(crate) fn span(&self, t: f64) -> usize {
        let n = self.span_count();
        let pos = self.knots[..n].partition_point(|&k| k <= t);
        pos.saturating_sub(1)
    }

    /// Non-zero B-spline basis functions of `degree` at `t` in span `span`.
    ///
    /// Entry `r` is the value of basis function `span - degree + r`
    /// (Cox-de Boor triangle, The NURBS Book A2.2).
    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn basis(&self, span: usize, t: f64, degree: usize) -> Vec<f64> {
        let i = span as isize;
        let mut n = vec![0.0; degree + 1];
        let mut left = vec![0.0; degree + 1];
        let mut right = vec![0.0; degree + 1];
        n[0] = 1.0;
        for j in 1..=degree {
            left[j] = t - self.knot(i + 1 - j as isize);
            right[j] = self.knot(i + j as isize) - t;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }
        n
    }

    /// First derivatives of the non-zero basis functions, indexed like
    /// [`PeriodicKnots::basis`].
    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    pub(crate) fn basis_derivative(&self, span: usize, t: f64, degree: usize) -> Vec<f64> {
        let mut out = vec![0.0; degree + 1];
        if degree == 0 {
            return out;
        }
        let lower = self.basis(span, t, degree - 1);
        let p = degree as isize;
        let i = span as isize;
        let pf = degree as f64;
        for (r, value) in out.iter_mut().enumerate() {
            let j = i - p + r as isize;
            let first = if r == 0 {
                0.0
            } else {
                lower[r - 1] / (self.knot(j + p) - self.knot(j))
            };
            let second = if r == degree {
                0.0
            } else {
                lower[r] / (self.knot(j + p + 1) - self.knot(j + 1))
            };
            *value = pf * (first - second);
        }
        out
    }
}

/// A periodic (closed, seamless) non-rational B-spline curve.
///
/// The control polygon wraps around: basis function `k` weights control
/// point `k mod n`. Evaluation wraps the parameter into the domain, so the
/// curve and all its derivatives agree at the two ends.
#[derive(Debug, Clone)]
pub struct PeriodicBSpline {
    degree: usize,
    knots: PeriodicKnots,
    control_points: Vec<Point3>,
}

impl PeriodicBSpline {
    /// Creates a periodic B-spline from a knot period and control points.
    ///
    /// `knots` holds `control_points.len() + 1` strictly increasing values;
    /// the first and last bound the parameter domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the degree is zero, there are fewer than
    /// `degree + 1` control points, or the knot period does not match.
    pub fn new(degree: usize, knots: Vec<f64>, control_points: Vec<Point3>) -> Result<Self> {
        if degree == 0 {
            return Err(
                GeometryError::Degenerate("B-spline degree must be at least 1".into()).into(),
            );
        }
        if control_points.len() < degree + 1 {
            return Err(GeometryError::Degenerate(format!(
                "periodic B-spline of degree {degree} needs at least {} control points, got {}",
                degree + 1,
                control_points.len()
            ))
            .into());
        }
        if knots.len() != control_points.len() + 1 {
            return Err(GeometryError::Degenerate(format!(
                "expected {} knots, got {}",
                control_points.len() + 1,
                knots.len()
            ))
            .into());
        }
        let knots = PeriodicKnots::new(knots)?;
        Ok(Self {
            degree,
            knots,
            control_points,
        })
    }

    /// Returns the polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the control points of one period.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// Returns the knot period `u_0 ..= u_n`.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots.knots
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn control(&self, k: isize) -> &Point3 {
        let n = self.control_points.len() as isize;
        &self.control_points[k.rem_euclid(n) as usize]
    }

    #[allow(clippy::cast_possible_wrap)]
    fn combine(&self, span: usize, weights: &[f64]) -> Vector3 {
        let base = span as isize - self.degree as isize;
        weights
            .iter()
            .enumerate()
            .fold(Vector3::zeros(), |acc, (r, w)| {
                acc + self.control(base + r as isize).coords * *w
            })
    }
}

impl Curve for PeriodicBSpline {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let t = self.knots.domain().wrap(t);
        let span = self.knots.span(t);
        let weights = self.knots.basis(span, t, self.degree);
        Ok(Point3::from(self.combine(span, &weights)))
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let t = self.knots.domain().wrap(t);
        let span = self.knots.span(t);
        let weights = self.knots.basis_derivative(span, t, self.degree);
        Ok(self.combine(span, &weights))
    }

    fn domain(&self) -> CurveDomain {
        self.knots.domain()
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn is_periodic(&self) -> bool {
        true
    }
}

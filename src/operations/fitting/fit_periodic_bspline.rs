use tracing::{debug, error, info};

use crate::error::{OperationError, Result};
use crate::geometry::curve::{Curve, PeriodicBSpline, PeriodicKnots};
use crate::math::{Point3, TOLERANCE};

use super::cyclic_tridiagonal::solve_cyclic;

/// Fitted curve degree. Cubic interpolation gives C2 continuity.
const DEGREE: usize = 3;

/// How data points are assigned curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parameterization {
    /// Parameter steps proportional to the distance between samples.
    #[default]
    ChordLength,
    /// Unit parameter step between samples.
    Uniform,
}

/// Fitting options.
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    /// Parameter assignment for the samples.
    pub parameterization: Parameterization,
    /// Maximum allowed distance between the curve and any sample.
    pub tolerance: f64,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            parameterization: Parameterization::ChordLength,
            tolerance: 1e-6,
        }
    }
}

/// Fits a periodic cubic B-spline through a closed point loop.
///
/// The input must be closed: its last point is an exact copy of the first.
/// The distinct points are interpolated at their parameters, and the
/// resulting curve is periodic so start and end join with C2 continuity.
pub struct FitPeriodicBSpline<'a> {
    points: &'a [Point3],
    params: FitParams,
}

impl<'a> FitPeriodicBSpline<'a> {
    /// Creates a new `FitPeriodicBSpline` operation with default parameters.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self {
            points,
            params: FitParams::default(),
        }
    }

    /// Sets custom fitting parameters.
    #[must_use]
    pub fn with_params(mut self, params: FitParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the fit.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Failed`] if the loop is not closed, has
    /// fewer than four distinct points, contains coincident consecutive
    /// points, the interpolation system is singular, or the fitted curve
    /// misses a sample by more than the tolerance.
    pub fn execute(&self) -> Result<PeriodicBSpline> {
        self.fit().inspect_err(|e| error!("B-spline curve creation failed: {e}"))
    }

    fn fit(&self) -> Result<PeriodicBSpline> {
        let Some((last, rest)) = self.points.split_last() else {
            return Err(fit_failed("point set is empty"));
        };
        if rest.first() != Some(last) {
            return Err(fit_failed("point loop is not closed (last point must equal the first)"));
        }
        let data = rest;
        let n = data.len();
        if n < DEGREE + 1 {
            return Err(fit_failed(&format!(
                "need at least {} distinct points, got {n}",
                DEGREE + 1
            )));
        }

        let knots = self.parameters(data)?;

        // Interpolating at knot u_i only touches basis functions i-3..i-1;
        // shifting unknowns by two makes the system cyclic tridiagonal.
        let curve_knots = PeriodicKnots::new(knots.clone())?;
        let mut a = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        let mut c = Vec::with_capacity(n);
        for (i, &u) in knots[..n].iter().enumerate() {
            let span = curve_knots.span(u);
            debug_assert_eq!(span, i);
            let w = curve_knots.basis(span, u, DEGREE);
            a.push(w[0]);
            b.push(w[1]);
            c.push(w[2]);
        }

        let rhs: Vec<_> = data.iter().map(|p| p.coords).collect();
        let solution = solve_cyclic(&a, &b, &c, &rhs)
            .ok_or_else(|| fit_failed("interpolation system is singular"))?;

        // Unknown i is control point i - 2.
        let control_points: Vec<Point3> = (0..n)
            .map(|k| Point3::from(solution[(k + 2) % n]))
            .collect();

        let curve = PeriodicBSpline::new(DEGREE, knots.clone(), control_points)?;

        let mut max_error: f64 = 0.0;
        for (p, &u) in data.iter().zip(&knots) {
            let q = curve.evaluate(u)?;
            max_error = max_error.max((q - *p).norm());
        }
        debug!(max_error, "fit residual");
        if max_error > self.params.tolerance {
            return Err(fit_failed(&format!(
                "fit error {max_error:e} exceeds tolerance {:e}",
                self.params.tolerance
            )));
        }

        info!(control_points = n, "periodic B-spline curve created");
        Ok(curve)
    }

    /// Parameters `u_0 = 0 < u_1 < ... < u_n` for the closed loop, where
    /// `u_n` closes back onto the first point.
    fn parameters(&self, data: &[Point3]) -> Result<Vec<f64>> {
        let n = data.len();
        let mut knots = Vec::with_capacity(n + 1);
        knots.push(0.0);
        let mut acc = 0.0;
        for i in 0..n {
            let chord = (data[(i + 1) % n] - data[i]).norm();
            if chord < TOLERANCE {
                return Err(fit_failed(&format!(
                    "points {i} and {} coincide",
                    (i + 1) % n
                )));
            }
            acc += match self.params.parameterization {
                Parameterization::ChordLength => chord,
                Parameterization::Uniform => 1.0,
            };
            knots.push(acc);
        }
        Ok(knots)
    }
}

fn fit_failed(reason: &str) -> crate::error::SweepkitError {
    OperationError::Failed(format!("curve fit not done: {reason}")).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::sampling::{HelixParams, SampleHelix};
    use std::f64::consts::TAU;

    fn circle_loop(n: usize, radius: f64) -> Vec<Point3> {
        let mut pts: Vec<Point3> = (0..n)
            .map(|i| {
                let t = TAU * f64::from(u32::try_from(i).unwrap())
                    / f64::from(u32::try_from(n).unwrap());
                Point3::new(radius * t.cos(), radius * t.sin(), 0.0)
            })
            .collect();
        pts.push(pts[0]);
        pts
    }

    #[test]
    fn interpolates_helix_samples() {
        let params = HelixParams {
            n_points: 200,
            ..HelixParams::default()
        };
        let pts = SampleHelix::new(params).execute().unwrap();
        let curve = FitPeriodicBSpline::new(&pts).execute().unwrap();

        assert!(curve.is_periodic());
        assert_eq!(curve.control_points().len(), 200);
        for (p, &u) in pts.iter().zip(curve.knots()) {
            assert!((curve.evaluate(u).unwrap() - *p).norm() < 1e-6);
        }
    }

    #[test]
    fn fitted_curve_is_seamless() {
        let pts = circle_loop(24, 5.0);
        let curve = FitPeriodicBSpline::new(&pts).execute().unwrap();
        let d = curve.domain();
        let a = curve.evaluate(d.t_min).unwrap();
        let b = curve.evaluate(d.t_max).unwrap();
        assert!((a - b).norm() < 1e-12);
        let da = curve.derivative(d.t_min).unwrap();
        let db = curve.derivative(d.t_max - 1e-10).unwrap();
        assert!((da - db).norm() < 1e-6);
    }

    #[test]
    fn fitted_circle_stays_near_circle_between_samples() {
        let pts = circle_loop(64, 10.0);
        let curve = FitPeriodicBSpline::new(&pts).execute().unwrap();
        let d = curve.domain();
        for i in 0..500 {
            let t = d.t_min + d.span() * f64::from(i) / 500.0;
            let r = curve.evaluate(t).unwrap().coords.norm();
            assert!((r - 10.0).abs() < 1e-3, "radius {r} at t={t}");
        }
    }

    #[test]
    fn uniform_parameterization_also_interpolates() {
        let pts = circle_loop(10, 1.0);
        let params = FitParams {
            parameterization: Parameterization::Uniform,
            ..FitParams::default()
        };
        let curve = FitPeriodicBSpline::new(&pts)
            .with_params(params)
            .execute()
            .unwrap();
        assert_eq!(
            curve.knots(),
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
    }

    #[test]
    fn open_loop_rejected() {
        let mut pts = circle_loop(8, 1.0);
        pts.pop();
        assert!(FitPeriodicBSpline::new(&pts).execute().is_err());
    }

    #[test]
    fn too_few_points_rejected() {
        let pts = circle_loop(3, 1.0);
        assert!(FitPeriodicBSpline::new(&pts).execute().is_err());
        assert!(FitPeriodicBSpline::new(&[]).execute().is_err());
    }

    #[test]
    fn coincident_points_rejected() {
        let mut pts = circle_loop(8, 1.0);
        pts[3] = pts[2];
        let err = FitPeriodicBSpline::new(&pts).execute().unwrap_err();
        assert!(err.to_string().contains("coincide"), "{err}");
    }
}

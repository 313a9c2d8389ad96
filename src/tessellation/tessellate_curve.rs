use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::curve::Curve;
use crate::math::{Point3, Vector3};

use super::{Polyline, TessellationParams};

/// Pre-sampling density, relative to `max_segments`.
const OVERSAMPLING: usize = 4;

/// Length and bending of a curve, estimated from dense samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveMetrics {
    /// Approximate arc length.
    pub length: f64,
    /// Largest curvature found between consecutive samples.
    pub max_curvature: f64,
}

/// Tessellates a bounded curve into a polyline.
///
/// The segment count follows the chord-sag bound: an arc of length `s`
/// and curvature `k` deviates by about `k * s^2 / 8` from its chord, so
/// each piece of the curve needs `s * sqrt(k / (8 * tolerance))`
/// segments. Stations are then spread evenly by arc length.
pub struct TessellateCurve<'a> {
    curve: &'a dyn Curve,
    params: TessellationParams,
}

struct Samples {
    parameters: Vec<f64>,
    points: Vec<Point3>,
    tangents: Vec<Vector3>,
    closed: bool,
}

impl<'a> TessellateCurve<'a> {
    /// Creates a new `TessellateCurve` operation.
    #[must_use]
    pub fn new(curve: &'a dyn Curve, params: TessellationParams) -> Self {
        Self { curve, params }
    }

    /// Executes the tessellation, returning a polyline.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve domain is unbounded or the curve has
    /// a vanishing derivative.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn execute(&self) -> Result<Polyline> {
        let samples = self.samples()?;
        let (arc, weight) = samples.accumulate(self.params.tolerance);
        let length = arc.last().copied().unwrap_or(0.0);
        let total_weight = weight.last().copied().unwrap_or(0.0);

        let segments = (total_weight.ceil() as usize)
            .clamp(self.params.min_segments, self.params.max_segments);
        let stations = if samples.closed { segments } else { segments + 1 };

        let mut parameters = Vec::with_capacity(stations);
        let mut points = Vec::with_capacity(stations);
        for k in 0..stations {
            let s = length * k as f64 / segments as f64;
            let t = samples.parameter_at_length(&arc, s);
            parameters.push(t);
            points.push(self.curve.evaluate(t)?);
        }
        debug!(segments, length, "curve tessellated");
        Ok(Polyline {
            points,
            parameters,
            closed: samples.closed,
        })
    }

    /// Estimates the arc length and maximum curvature of the curve.
    ///
    /// # Errors
    ///
    /// See [`TessellateCurve::execute`].
    pub fn metrics(&self) -> Result<CurveMetrics> {
        let samples = self.samples()?;
        let mut length = 0.0;
        let mut max_curvature: f64 = 0.0;
        for i in 0..samples.interval_count() {
            let j = (i + 1) % samples.points.len();
            let ds = (samples.points[j] - samples.points[i]).norm();
            length += ds;
            if ds > 0.0 {
                let angle = turning_angle(&samples.tangents[i], &samples.tangents[j]);
                max_curvature = max_curvature.max(angle / ds);
            }
        }
        Ok(CurveMetrics {
            length,
            max_curvature,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn samples(&self) -> Result<Samples> {
        let domain = self.curve.domain();
        if !domain.is_bounded() || domain.span() <= 0.0 {
            return Err(OperationError::InvalidInput(
                "curve tessellation needs a bounded parameter domain".into(),
            )
            .into());
        }
        let closed = self.curve.is_closed();
        let intervals = self.params.max_segments.max(1) * OVERSAMPLING;
        let count = if closed { intervals } else { intervals + 1 };

        let mut parameters = Vec::with_capacity(count);
        let mut points = Vec::with_capacity(count);
        let mut tangents = Vec::with_capacity(count);
        for i in 0..count {
            let t = domain.t_min + domain.span() * i as f64 / intervals as f64;
            parameters.push(t);
            points.push(self.curve.evaluate(t)?);
            tangents.push(self.curve.tangent(t)?);
        }
        Ok(Samples {
            parameters,
            points,
            tangents,
            closed,
        })
    }
}

impl Samples {
    fn interval_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Cumulative arc length and cumulative segment weight at each sample,
    /// including the closing sample for a closed curve.
    fn accumulate(&self, tolerance: f64) -> (Vec<f64>, Vec<f64>) {
        let sag = 8.0 * tolerance;
        let mut arc = vec![0.0];
        let mut weight = vec![0.0];
        for i in 0..self.interval_count() {
            let j = (i + 1) % self.points.len();
            let ds = (self.points[j] - self.points[i]).norm();
            let angle = turning_angle(&self.tangents[i], &self.tangents[j]);
            arc.push(arc[i] + ds);
            weight.push(weight[i] + (angle * ds / sag).sqrt());
        }
        (arc, weight)
    }

    /// Curve parameter at arc length `s`, interpolated between samples.
    fn parameter_at_length(&self, arc: &[f64], s: f64) -> f64 {
        let i = arc.partition_point(|&a| a <= s).clamp(1, arc.len() - 1) - 1;
        let t0 = self.parameters[i];
        let t1 = if i + 1 < self.parameters.len() {
            self.parameters[i + 1]
        } else {
            // Closing interval of a closed curve: one step past the last sample.
            2.0 * self.parameters[i] - self.parameters[i - 1]
        };
        let ds = arc[i + 1] - arc[i];
        if ds <= 0.0 {
            return t0;
        }
        t0 + (t1 - t0) * ((s - arc[i]) / ds).clamp(0.0, 1.0)
    }
}

fn turning_angle(a: &Vector3, b: &Vector3) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

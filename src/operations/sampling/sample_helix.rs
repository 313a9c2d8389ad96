use std::f64::consts::TAU;

use tracing::{debug, error};

use crate::error::{OperationError, Result};
use crate::math::Point3;

/// Parameters of a helix wound around a base circle in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixParams {
    /// Diameter `D` of the base circle.
    pub circle_diameter: f64,
    /// Amplitude `A` of the helical offset around the base circle.
    pub helix_offset: f64,
    /// Number `R` of helical turns per trip around the base circle.
    pub rotations: i32,
    /// Number `N` of distinct samples.
    pub n_points: usize,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            circle_diameter: 100.0,
            helix_offset: 10.0,
            rotations: 3,
            n_points: 1000,
        }
    }
}

impl HelixParams {
    /// Radius of the sphere around the origin that contains every sample,
    /// `D/2 + |A|`.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        self.circle_diameter.abs() / 2.0 + self.helix_offset.abs()
    }
}

/// Samples a closed helical loop around a base circle.
///
/// For `i` in `0..N`, with `t = 2*pi*i/N`:
///
/// ```text
/// x = (D/2)*cos(t) + A*cos(R*t)*cos(t)
/// y = (D/2)*sin(t) + A*cos(R*t)*sin(t)
/// z = A*sin(R*t)
/// ```
///
/// The returned sequence has `N + 1` points; the last is an exact copy of
/// the first so the loop can be fitted as a periodic curve.
pub struct SampleHelix {
    params: HelixParams,
}

impl SampleHelix {
    /// Creates a new `SampleHelix` operation.
    #[must_use]
    pub fn new(params: HelixParams) -> Self {
        Self { params }
    }

    /// Executes the sampling.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `N < 1` or a dimension is
    /// not finite.
    #[allow(clippy::cast_precision_loss)]
    pub fn execute(&self) -> Result<Vec<Point3>> {
        let HelixParams {
            circle_diameter,
            helix_offset,
            rotations,
            n_points,
        } = self.params;

        if n_points < 1 {
            error!("helix sampling rejected: sample count is zero");
            return Err(
                OperationError::InvalidInput("helix needs at least one sample".into()).into(),
            );
        }
        if !circle_diameter.is_finite() || !helix_offset.is_finite() {
            error!(circle_diameter, helix_offset, "helix sampling rejected: non-finite dimension");
            return Err(
                OperationError::InvalidInput("helix dimensions must be finite".into()).into(),
            );
        }

        let radius = circle_diameter / 2.0;
        let delta_t = TAU / n_points as f64;
        let turns = f64::from(rotations);

        let mut points = Vec::with_capacity(n_points + 1);
        for i in 0..n_points {
            let t = delta_t * i as f64;
            let (sin_t, cos_t) = t.sin_cos();
            let (sin_local, cos_local) = (turns * t).sin_cos();

            let x = radius * cos_t + helix_offset * cos_local * cos_t;
            let y = radius * sin_t + helix_offset * cos_local * sin_t;
            let z = helix_offset * sin_local;
            points.push(Point3::new(x, y, z));
        }
        points.push(points[0]);

        debug!(samples = points.len(), "helix sampled");
        Ok(points)
    }
}

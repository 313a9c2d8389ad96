mod tessellate_curve;
mod triangulate_polygon;

pub use tessellate_curve::{CurveMetrics, TessellateCurve};
pub use triangulate_polygon::TriangulatePolygon;

use crate::math::Point3;

/// Parameters controlling tessellation quality.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Maximum allowed deviation from the true geometry.
    pub tolerance: f64,
    /// Minimum number of segments for curves.
    pub min_segments: usize,
    /// Maximum number of segments for curves.
    pub max_segments: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            min_segments: 4,
            max_segments: 256,
        }
    }
}

/// A polyline approximation of a curve.
///
/// For a closed curve the last point is not repeated; the segment from the
/// last point back to the first is implied by `closed`.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
    /// Curve parameter of each vertex.
    pub parameters: Vec<f64>,
    /// Whether the polyline wraps back to its first point.
    pub closed: bool,
}

impl Polyline {
    /// Number of segments, counting the closing one.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }
}

/// Number of segments needed to approximate an arc of `radius` spanning
/// `sweep` radians within the chord tolerance.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn adaptive_angular_segments(radius: f64, sweep: f64, params: &TessellationParams) -> usize {
    if radius > params.tolerance {
        let half_angle = (1.0 - params.tolerance / radius).acos();
        let computed = (sweep / (2.0 * half_angle)).ceil() as usize;
        computed.clamp(params.min_segments, params.max_segments)
    } else {
        params.min_segments
    }
}

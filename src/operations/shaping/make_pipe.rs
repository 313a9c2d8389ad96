use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use tracing::{debug, error, info};

use crate::error::{GeometryError, OperationError, Result, SweepkitError};
use crate::geometry::curve::{Circle, Curve};
use crate::math::{rotate_about, Point3, Vector3, TOLERANCE};
use crate::mesh::{SurfaceMesh, Solid};
use crate::tessellation::{
    adaptive_angular_segments, Polyline, TessellateCurve, TessellationParams,
};

/// Sweep tessellation options.
///
/// Segment counts left as `None` are derived from `tessellation`: the
/// profile from the chord tolerance of its circle, the spine from its
/// length and curvature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepParams {
    /// Chord tolerance and segment limits.
    pub tessellation: TessellationParams,
    /// Fixed number of segments around the profile circle.
    pub profile_segments: Option<usize>,
    /// Fixed number of segments along the spine.
    pub spine_segments: Option<usize>,
}

/// Sweeps a circular profile along a spine curve into a closed pipe.
///
/// The profile is the circle of the given diameter centred on the spine
/// start, in the plane normal to the start tangent. It is carried along
/// the spine by a rotation-minimizing frame (double reflection). On a
/// closed spine the last ring joins the first and the frame's residual
/// twist is spread evenly over the length; an open spine gets flat end
/// caps. The result is always a closed, outward-facing [`Solid`].
pub struct MakePipe<'a> {
    spine: &'a dyn Curve,
    diameter: f64,
    params: SweepParams,
}

impl<'a> MakePipe<'a> {
    /// Creates a new `MakePipe` operation with default parameters.
    #[must_use]
    pub fn new(spine: &'a dyn Curve, diameter: f64) -> Self {
        Self {
            spine,
            diameter,
            params: SweepParams::default(),
        }
    }

    /// Sets custom sweep parameters.
    #[must_use]
    pub fn with_params(mut self, params: SweepParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a non-positive
    /// diameter, [`GeometryError::DegenerateTangent`] if the spine has no
    /// tangent at its start, and [`OperationError::Failed`] if the spine
    /// has zero length, bends tighter than the profile radius, passes
    /// closer to itself than the diameter, or the swept surface does not
    /// close.
    pub fn execute(&self) -> Result<Solid> {
        self.sweep()
            .inspect_err(|e| error!("pipe sweep failed: {e}"))
    }

    fn sweep(&self) -> Result<Solid> {
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "sweep not done: pipe diameter must be positive, got {}",
                self.diameter
            ))
            .into());
        }
        let radius = self.diameter / 2.0;

        let domain = self.spine.domain();
        let start = self.spine.evaluate(domain.t_min)?;
        let start_tangent = self.spine.derivative(domain.t_min)?;
        if start_tangent.norm() < TOLERANCE {
            return Err(GeometryError::DegenerateTangent(domain.t_min).into());
        }
        let profile = Circle::from_axis(start, start_tangent, radius)?;

        let tessellation = self.params.tessellation;
        let metrics = TessellateCurve::new(self.spine, tessellation).metrics()?;
        if metrics.length < TOLERANCE {
            return Err(sweep_failed("spine has zero length"));
        }
        if metrics.max_curvature * radius > 1.0 {
            return Err(sweep_failed(&format!(
                "spine bends with radius {:.4} below the profile radius {radius}",
                1.0 / metrics.max_curvature
            )));
        }

        let spine_params = match self.params.spine_segments {
            Some(n) => TessellationParams {
                min_segments: n.max(1),
                max_segments: n.max(1),
                ..tessellation
            },
            None => tessellation,
        };
        let stations = TessellateCurve::new(self.spine, spine_params).execute()?;
        // Parts of the spine less than half a profile turn apart may sit
        // closer than the diameter without the tube crossing itself.
        if let Some(dist) = self_approach(&stations, self.diameter, PI * radius) {
            return Err(sweep_failed(&format!(
                "spine passes within {dist:.4} of itself, below the pipe diameter {}",
                self.diameter
            )));
        }
        let ring_size = self
            .params
            .profile_segments
            .unwrap_or_else(|| adaptive_angular_segments(radius, TAU, &tessellation))
            .max(3);

        let frames = self.frames(&stations, &profile)?;
        let mesh = build_mesh(&stations, &frames, radius, ring_size);
        debug!(
            stations = stations.points.len(),
            ring_size,
            triangles = mesh.face_count(),
            "pipe surface built"
        );

        let open = mesh.boundary_edges().len();
        if open > 0 {
            return Err(sweep_failed(&format!("swept surface has {open} open edges")));
        }
        let solid = Solid::new(mesh).map_err(|e| sweep_failed(&e.to_string()))?;
        info!(
            triangles = solid.mesh().face_count(),
            volume = solid.volume(),
            "pipe created"
        );
        Ok(solid)
    }

    /// Unit tangent and profile reference direction at each station.
    fn frames(&self, stations: &Polyline, profile: &Circle) -> Result<Vec<(Vector3, Vector3)>> {
        let tangents = stations
            .parameters
            .iter()
            .map(|&t| self.spine.tangent(t))
            .collect::<Result<Vec<_>>>()?;

        let mut refs = Vec::with_capacity(tangents.len());
        refs.push(*profile.ref_dir());
        for i in 1..tangents.len() {
            let next = reflect_frame(
                &stations.points[i - 1],
                &tangents[i - 1],
                &refs[i - 1],
                &stations.points[i],
                &tangents[i],
            );
            refs.push(next);
        }

        if stations.closed {
            let last = tangents.len() - 1;
            let wrapped = reflect_frame(
                &stations.points[last],
                &tangents[last],
                &refs[last],
                &stations.points[0],
                &tangents[0],
            );
            // Angle that takes the transported frame back onto the start.
            let twist = tangents[0]
                .dot(&wrapped.cross(&refs[0]))
                .atan2(wrapped.dot(&refs[0]));
            let n = stations.points.len();
            let mut arc = vec![0.0; n + 1];
            for i in 0..n {
                arc[i + 1] = arc[i] + (stations.points[(i + 1) % n] - stations.points[i]).norm();
            }
            let total = arc[n];
            for (i, r) in refs.iter_mut().enumerate().skip(1) {
                *r = rotate_about(r, &tangents[i], twist * arc[i] / total);
            }
            debug!(twist, "closed-spine frame twist distributed");
        }

        Ok(tangents.into_iter().zip(refs).collect())
    }
}

/// Transports the reference direction `r0` from station 0 to station 1
/// by the double-reflection method (Wang et al., 2008).
fn reflect_frame(p0: &Point3, t0: &Vector3, r0: &Vector3, p1: &Point3, t1: &Vector3) -> Vector3 {
    let v1 = p1 - p0;
    let c1 = v1.dot(&v1);
    let (r_l, t_l) = if c1 > TOLERANCE * TOLERANCE {
        (
            r0 - v1 * (2.0 / c1 * v1.dot(r0)),
            t0 - v1 * (2.0 / c1 * v1.dot(t0)),
        )
    } else {
        (*r0, *t0)
    };
    let v2 = t1 - t_l;
    let c2 = v2.dot(&v2);
    let r = if c2 > TOLERANCE * TOLERANCE {
        r_l - v2 * (2.0 / c2 * v2.dot(&r_l))
    } else {
        r_l
    };
    let r = r - t1 * r.dot(t1);
    r.normalize()
}

/// Builds the ring vertices, side quads and, for an open spine, the caps.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn build_mesh(
    stations: &Polyline,
    frames: &[(Vector3, Vector3)],
    radius: f64,
    ring_size: usize,
) -> SurfaceMesh {
    let mut mesh = SurfaceMesh::new();
    let angles: Vec<(f64, f64)> = (0..ring_size)
        .map(|j| (TAU * j as f64 / ring_size as f64).sin_cos())
        .collect();

    for (center, (tangent, u)) in stations.points.iter().zip(frames) {
        let v = tangent.cross(u);
        for &(sin, cos) in &angles {
            mesh.add_vertex(center + (u * cos + v * sin) * radius);
        }
    }

    let n = stations.points.len();
    let k = ring_size as u32;
    let index = |i: usize, j: usize| (i * ring_size) as u32 + (j % ring_size) as u32;
    for i in 0..stations.segment_count() {
        let i1 = (i + 1) % n;
        for j in 0..ring_size {
            let a = index(i, j);
            let b = index(i, j + 1);
            let c = index(i1, j + 1);
            let d = index(i1, j);
            mesh.add_triangle(a, b, c);
            mesh.add_triangle(a, c, d);
        }
    }

    if !stations.closed {
        let first = mesh.add_vertex(stations.points[0]);
        let last = mesh.add_vertex(stations.points[n - 1]);
        let end = (n - 1) * ring_size;
        for j in 0..k {
            let next = (j + 1) % k;
            mesh.add_triangle(first, next, j);
            mesh.add_triangle(last, end as u32 + j, end as u32 + next);
        }
    }
    mesh
}

/// Closest distance below `gap` between two points of the polyline that
/// lie more than `neighbourhood` apart along it.
///
/// The polyline is resampled at a quarter of `gap` and the samples are
/// bucketed in a grid with cells of size `gap`, so only samples in
/// adjacent cells are compared.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn self_approach(stations: &Polyline, gap: f64, neighbourhood: f64) -> Option<f64> {
    let n = stations.points.len();
    let step = gap / 4.0;
    let mut samples: Vec<(Point3, f64)> = Vec::new();
    let mut total = 0.0;
    for i in 0..stations.segment_count() {
        let a = stations.points[i];
        let b = stations.points[(i + 1) % n];
        let len = (b - a).norm();
        let pieces = ((len / step).ceil() as usize).max(1);
        for k in 0..pieces {
            let s = k as f64 / pieces as f64;
            samples.push((a + (b - a) * s, total + len * s));
        }
        total += len;
    }
    if !stations.closed {
        if let Some(&last) = stations.points.last() {
            samples.push((last, total));
        }
    }

    let cell = |p: &Point3| {
        [
            (p.x / gap).floor() as i64,
            (p.y / gap).floor() as i64,
            (p.z / gap).floor() as i64,
        ]
    };
    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    let mut closest: Option<f64> = None;
    for (i, (p, s)) in samples.iter().enumerate() {
        let [cx, cy, cz] = cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&[cx + dx, cy + dy, cz + dz]) else {
                        continue;
                    };
                    for &j in bucket {
                        let (q, t) = &samples[j];
                        let mut apart = (s - t).abs();
                        if stations.closed {
                            apart = apart.min(total - apart);
                        }
                        let dist = (p - q).norm();
                        if apart > neighbourhood && dist + TOLERANCE < gap {
                            closest = Some(closest.map_or(dist, |c: f64| c.min(dist)));
                        }
                    }
                }
            }
        }
        grid.entry([cx, cy, cz]).or_default().push(i);
    }
    closest
}

fn sweep_failed(reason: &str) -> SweepkitError {
    OperationError::Failed(format!("sweep not done: {reason}")).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Line, PeriodicBSpline};
    use crate::operations::fitting::FitPeriodicBSpline;
    use crate::operations::sampling::{HelixParams, SampleHelix};

    fn tight() -> SweepParams {
        SweepParams {
            tessellation: TessellationParams {
                tolerance: 1e-4,
                ..TessellationParams::default()
            },
            ..SweepParams::default()
        }
    }

    #[test]
    fn straight_pipe_volume_is_cylinder() {
        let spine = Line::segment(Point3::origin(), Point3::new(0.0, 0.0, 10.0)).unwrap();
        let solid = MakePipe::new(&spine, 2.0).with_params(tight()).execute().unwrap();
        let expected = PI * 1.0 * 10.0;
        let volume = solid.volume();
        assert!((volume - expected).abs() / expected < 0.01, "volume {volume}");
        assert!(solid.mesh().is_closed());
    }

    #[test]
    fn first_ring_lies_on_the_profile_circle() {
        let spine = Line::segment(Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 2.0, 3.0))
            .unwrap();
        let solid = MakePipe::new(&spine, 1.0).execute().unwrap();
        let mesh = solid.mesh();
        let p = mesh.vertices[0];
        assert!(((p - Point3::new(1.0, 2.0, 3.0)).norm() - 0.5).abs() < 1e-12);
        assert!((p.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ring_around_circle_spine_is_a_torus() {
        let spine = Circle::from_axis(Point3::origin(), Vector3::z(), 10.0).unwrap();
        let params = SweepParams {
            profile_segments: Some(64),
            spine_segments: Some(256),
            ..SweepParams::default()
        };
        let solid = MakePipe::new(&spine, 2.0).with_params(params).execute().unwrap();
        let mesh = solid.mesh();
        assert_eq!(mesh.vertex_count(), 256 * 64);
        // Torus volume 2 * pi^2 * R * r^2.
        let expected = 2.0 * PI * PI * 10.0;
        assert!((solid.volume() - expected).abs() / expected < 0.01);
        for v in &mesh.vertices {
            let ring = (v.x.hypot(v.y) - 10.0).hypot(v.z);
            assert!((ring - 1.0).abs() < 1e-6, "off tube by {}", ring - 1.0);
        }
    }

    #[test]
    fn non_positive_diameter_rejected() {
        let spine = Line::segment(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(MakePipe::new(&spine, 0.0).execute().is_err());
        assert!(MakePipe::new(&spine, -1.0).execute().is_err());
    }

    #[test]
    fn too_tight_bend_rejected() {
        let spine = Circle::from_axis(Point3::origin(), Vector3::z(), 1.0).unwrap();
        let err = MakePipe::new(&spine, 4.0).execute().unwrap_err();
        assert!(err.to_string().contains("sweep not done"), "{err}");
    }

    #[test]
    fn spine_with_coincident_control_points_has_no_tangent() {
        let spline = PeriodicBSpline::new(
            3,
            vec![0.0, 1.0, 2.0, 3.0, 4.0],
            vec![Point3::new(1.0, 2.0, 3.0); 4],
        )
        .unwrap();
        let result = MakePipe::new(&spline, 1.0).execute();
        assert!(
            matches!(
                result,
                Err(SweepkitError::Geometry(GeometryError::DegenerateTangent(_)))
            ),
            "{result:?}"
        );
    }

    #[test]
    fn self_crossing_spine_rejected() {
        // With no base circle every helix turn passes through the poles.
        let params = HelixParams {
            circle_diameter: 0.0,
            helix_offset: 10.0,
            rotations: 3,
            n_points: 400,
        };
        let samples = SampleHelix::new(params).execute().unwrap();
        let spine = FitPeriodicBSpline::new(&samples).execute().unwrap();
        let err = MakePipe::new(&spine, 5.0).execute().unwrap_err();
        assert!(err.to_string().contains("passes within"), "{err}");
    }

    #[test]
    fn close_but_distant_parts_of_open_spine_found() {
        // A U-turn whose legs run 1.0 apart.
        let stations = Polyline {
            points: vec![
                Point3::origin(),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(10.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            parameters: vec![0.0, 1.0, 2.0, 3.0],
            closed: false,
        };
        let dist = self_approach(&stations, 2.0, PI).unwrap();
        assert!((dist - 1.0).abs() < 1e-9, "{dist}");
        assert!(self_approach(&stations, 0.5, PI).is_none());
    }
}

use std::f64::consts::{PI, TAU};

use tracing::{debug, error, info};

use crate::error::{OperationError, Result};
use crate::math::{perpendicular_dir, Vector3};
use crate::mesh::{Polyhedron, Ray, Rgb, SurfaceMesh, TriangleBvh};

/// Ray-casting options for [`WallThickness`].
#[derive(Debug, Clone, Copy)]
pub struct ThicknessParams {
    /// Rays cast per face.
    pub rays: usize,
    /// Full opening angle of the ray cone, in radians.
    pub cone_angle: f64,
    /// Drop ray lengths further than one standard deviation from the
    /// median before averaging.
    pub filter_outliers: bool,
}

impl Default for ThicknessParams {
    fn default() -> Self {
        Self {
            rays: 25,
            cone_angle: 2.0 * PI / 3.0,
            filter_outliers: true,
        }
    }
}

/// Per-face wall thickness of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessMap {
    /// Thickness estimate of each triangle, in mesh units.
    pub per_face: Vec<f64>,
    /// Smallest estimate.
    pub min: f64,
    /// Largest estimate.
    pub max: f64,
}

impl ThicknessMap {
    /// Indices of faces thinner than `threshold`.
    #[must_use]
    pub fn faces_below(&self, threshold: f64) -> Vec<usize> {
        self.per_face
            .iter()
            .enumerate()
            .filter(|&(_, &t)| t < threshold)
            .map(|(f, _)| f)
            .collect()
    }

    /// Estimates rescaled to `[0, 1]` over the `min..max` range.
    #[must_use]
    pub fn normalized(&self) -> Vec<f64> {
        let span = self.max - self.min;
        self.per_face
            .iter()
            .map(|t| if span > 0.0 { (t - self.min) / span } else { 0.0 })
            .collect()
    }

    /// Colours the vertices of every face thinner than `threshold` with
    /// `color` and all other vertices white. Returns the number of faces
    /// painted.
    pub fn paint_below(&self, mesh: &mut SurfaceMesh, threshold: f64, color: Rgb) -> usize {
        let mut colors = vec![Rgb::WHITE; mesh.vertex_count()];
        let thin = self.faces_below(threshold);
        for &f in &thin {
            for &v in &mesh.faces[f] {
                colors[v as usize] = color;
            }
        }
        mesh.colors = Some(colors);
        debug!(faces = thin.len(), threshold, "thin faces painted");
        thin.len()
    }
}

/// Estimates local wall thickness with the shape diameter function.
///
/// From each triangle centroid a cone of rays is cast into the mesh,
/// opposite to the face normal. A ray counts if the first surface it meets
/// faces away from it, i.e. the ray left through the opposite wall. The
/// lengths of the counted rays are averaged per face after median-based
/// outlier rejection. Faces where no ray counts take the average of their
/// neighbours.
///
/// The mesh is expected to be closed and outward-facing.
#[derive(Debug, Default)]
pub struct WallThickness {
    params: ThicknessParams,
}

impl WallThickness {
    /// Creates a new `WallThickness` analysis with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets custom ray-casting parameters.
    #[must_use]
    pub fn with_params(mut self, params: ThicknessParams) -> Self {
        self.params = params;
        self
    }

    /// Computes the per-face thickness of a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for an empty mesh or a
    /// zero ray count, and [`OperationError::Failed`] if no ray hits the
    /// mesh at all.
    pub fn execute(&self, mesh: &SurfaceMesh) -> Result<ThicknessMap> {
        self.compute(mesh)
            .inspect_err(|e| error!("wall thickness failed: {e}"))
    }

    /// Computes only the thickness range `(min, max)` of a polyhedron.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::MeshError::NotTriangleMesh`] if a face is
    /// not a triangle; otherwise as [`WallThickness::execute`].
    pub fn range(&self, poly: &Polyhedron) -> Result<(f64, f64)> {
        let mesh = poly.to_surface_mesh()?;
        let map = self.execute(&mesh)?;
        Ok((map.min, map.max))
    }

    fn compute(&self, mesh: &SurfaceMesh) -> Result<ThicknessMap> {
        if mesh.is_empty() {
            return Err(OperationError::InvalidInput("mesh has no faces".into()).into());
        }
        if self.params.rays == 0 {
            return Err(OperationError::InvalidInput("ray count must be positive".into()).into());
        }

        let bvh = TriangleBvh::build(mesh);
        let cone = cone_directions(self.params.rays, self.params.cone_angle / 2.0);
        let mut values: Vec<Option<f64>> = (0..mesh.face_count())
            .map(|f| self.face_thickness(mesh, &bvh, &cone, f))
            .collect();

        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing == values.len() {
            return Err(OperationError::Failed(
                "wall thickness not done: no ray hit the mesh".into(),
            )
            .into());
        }
        if missing > 0 {
            debug!(missing, "filling faces without hits from neighbours");
            fill_from_neighbours(&mut values, &mesh.face_adjacency());
        }

        // Faces in components without any hit fall back to the global mean.
        let known: Vec<f64> = values.iter().flatten().copied().collect();
        #[allow(clippy::cast_precision_loss)]
        let mean = known.iter().sum::<f64>() / known.len() as f64;
        let per_face: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(mean)).collect();

        let min = per_face.iter().copied().fold(f64::INFINITY, f64::min);
        let max = per_face.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        info!(min, max, faces = per_face.len(), "wall thickness computed");
        Ok(ThicknessMap { per_face, min, max })
    }

    fn face_thickness(
        &self,
        mesh: &SurfaceMesh,
        bvh: &TriangleBvh<'_>,
        cone: &[(f64, f64, f64)],
        face: usize,
    ) -> Option<f64> {
        let normal = mesh.face_normal(face)?;
        let axis = -normal;
        let u = perpendicular_dir(&axis);
        let v = axis.cross(&u);
        let origin = mesh.face_centroid(face);

        let mut lengths: Vec<f64> = cone
            .iter()
            .filter_map(|&(cos_t, sin_t, phi)| {
                let dir: Vector3 = axis * cos_t + (u * phi.cos() + v * phi.sin()) * sin_t;
                let ray = Ray::new(origin, dir);
                let hit = bvh.trace_closest(&ray, Some(face))?;
                let hit_normal = mesh.face_normal(hit.face)?;
                (hit_normal.dot(&ray.direction) > 0.0).then_some(hit.t)
            })
            .collect();
        if lengths.is_empty() {
            return None;
        }
        if self.params.filter_outliers {
            lengths = reject_outliers(lengths);
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        Some(mean)
    }
}

/// Ray directions in a cone of the given half-angle as
/// `(cos theta, sin theta, phi)`, spread by a golden-angle spiral over the
/// spherical cap.
#[allow(clippy::cast_precision_loss)]
fn cone_directions(count: usize, half_angle: f64) -> Vec<(f64, f64, f64)> {
    let golden = PI * (3.0 - 5.0_f64.sqrt());
    let cap = 1.0 - half_angle.cos();
    (0..count)
        .map(|k| {
            let cos_t = 1.0 - cap * (k as f64 + 0.5) / count as f64;
            let sin_t = (1.0 - cos_t * cos_t).max(0.0).sqrt();
            (cos_t, sin_t, (golden * k as f64) % TAU)
        })
        .collect()
}

/// Keeps the values within one standard deviation of the median.
#[allow(clippy::cast_precision_loss)]
fn reject_outliers(mut values: Vec<f64>) -> Vec<f64> {
    if values.len() < 3 {
        return values;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    let mean = values.iter().sum::<f64>() / n as f64;
    let deviation = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt();
    let kept: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| (v - median).abs() <= deviation)
        .collect();
    if kept.is_empty() {
        values
    } else {
        kept
    }
}

/// Repeatedly assigns unknown faces the mean of their known neighbours
/// until nothing changes.
#[allow(clippy::cast_precision_loss)]
fn fill_from_neighbours(values: &mut [Option<f64>], adjacency: &[Vec<usize>]) {
    loop {
        let updates: Vec<(usize, f64)> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .filter_map(|(f, _)| {
                let known: Vec<f64> = adjacency[f].iter().filter_map(|&g| values[g]).collect();
                (!known.is_empty()).then(|| (f, known.iter().sum::<f64>() / known.len() as f64))
            })
            .collect();
        if updates.is_empty() {
            return;
        }
        for (f, value) in updates {
            values[f] = Some(value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;

    fn narrow() -> ThicknessParams {
        ThicknessParams {
            cone_angle: PI / 6.0,
            ..ThicknessParams::default()
        }
    }

    fn plate() -> SurfaceMesh {
        MakeBox::from_size(10.0, 10.0, 1.0).execute().unwrap().into_mesh()
    }

    #[test]
    fn plate_faces_report_plate_thickness() {
        let mesh = plate();
        let map = WallThickness::new().with_params(narrow()).execute(&mesh).unwrap();
        assert_eq!(map.per_face.len(), 12);
        // Bottom and top triangles come first.
        for f in 0..4 {
            let t = map.per_face[f];
            assert!((t - 1.0).abs() < 0.05, "face {f}: {t}");
        }
        assert!((map.min - 1.0).abs() < 0.05);
        assert_eq!(map.faces_below(1.1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn painting_marks_thin_face_vertices() {
        let mut mesh = plate();
        let map = WallThickness::new().with_params(narrow()).execute(&mesh).unwrap();
        let painted = map.paint_below(&mut mesh, 1.1, Rgb::RED);
        assert_eq!(painted, 4);
        let colors = mesh.colors.as_ref().unwrap();
        assert_eq!(colors.len(), 8);
        assert!(colors.iter().all(|&c| c == Rgb::RED));
    }

    #[test]
    fn polyhedron_range_matches_mesh() {
        let mesh = plate();
        let poly = Polyhedron::from_surface_mesh(&mesh).unwrap();
        let analysis = WallThickness::new().with_params(narrow());
        let (min, max) = analysis.range(&poly).unwrap();
        let map = analysis.execute(&mesh).unwrap();
        assert!((min - map.min).abs() < 1e-12);
        assert!((max - map.max).abs() < 1e-12);
    }

    #[test]
    fn lone_triangle_has_no_thickness() {
        let mesh = SurfaceMesh::from_parts(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        assert!(WallThickness::new().execute(&mesh).is_err());
    }

    #[test]
    fn cone_directions_stay_in_cone() {
        let half = PI / 3.0;
        for (cos_t, sin_t, _) in cone_directions(25, half) {
            assert!(cos_t >= half.cos() - 1e-12);
            assert!((cos_t * cos_t + sin_t * sin_t - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn outliers_are_dropped() {
        let kept = reject_outliers(vec![1.0, 1.1, 0.9, 1.0, 50.0]);
        assert!(!kept.contains(&50.0));
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn unknown_faces_take_neighbour_mean() {
        let mut values = vec![Some(1.0), None, Some(3.0), None];
        let adjacency = vec![vec![1], vec![0, 2], vec![1, 3], vec![2]];
        fill_from_neighbours(&mut values, &adjacency);
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0), Some(3.0)]);
    }
}

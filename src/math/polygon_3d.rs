use super::{perpendicular_dir, Point2, Point3, Vector3, TOLERANCE};

/// Computes the unit normal of a closed polygon using Newell's method.
///
/// Returns `None` when the polygon is degenerate (collinear or empty).
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    (len > TOLERANCE).then(|| normal / len)
}

/// Projects points onto the plane through their centroid with the given
/// unit normal, returning 2D coordinates in an orthonormal `(u, v)` basis
/// with `u x v = normal`.
#[must_use]
pub fn project_to_plane(points: &[Point3], normal: &Vector3) -> Vec<Point2> {
    let u_dir = perpendicular_dir(normal);
    let v_dir = normal.cross(&u_dir);
    let origin = centroid(points);
    points
        .iter()
        .map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u_dir), d.dot(&v_dir))
        })
        .collect()
}

/// Arithmetic mean of a non-empty point set (origin for an empty set).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Signed area of a 2D polygon (positive when counter-clockwise).
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += cross_2d(a.x, a.y, b.x, b.y);
    }
    twice / 2.0
}

/// Returns `true` if no two non-adjacent edges of the closed polygon touch
/// and no vertex is repeated.
#[must_use]
pub fn is_simple_polygon_2d(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            if (points[i] - points[j]).norm() < TOLERANCE {
                return false;
            }
        }
    }
    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 1)..n {
            // Skip edges sharing a vertex with edge i.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            if segments_intersect(a0, a1, b0, b1) {
                return false;
            }
        }
    }
    true
}

/// Closed-segment intersection test, including touching and collinear overlap.
fn segments_intersect(a0: Point2, a1: Point2, b0: Point2, b1: Point2) -> bool {
    let d1 = orient(b0, b1, a0);
    let d2 = orient(b0, b1, a1);
    let d3 = orient(a0, a1, b0);
    let d4 = orient(a0, a1, b1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b0, b1, a0))
        || (d2 == 0.0 && on_segment(b0, b1, a1))
        || (d3 == 0.0 && on_segment(a0, a1, b0))
        || (d4 == 0.0 && on_segment(a0, a1, b1))
}

fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    cross_2d(b.x - a.x, b.y - a.y, c.x - a.x, c.y - a.y)
}

fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn newell_normal_of_ccw_square_is_plus_z() {
        let square = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(&square).unwrap();
        assert!((n - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn newell_normal_of_collinear_points_is_none() {
        let line = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(newell_normal(&line).is_none());
    }

    #[test]
    fn projection_preserves_orientation() {
        let square = [
            p(0.0, 0.0, 2.0),
            p(1.0, 0.0, 2.0),
            p(1.0, 1.0, 2.0),
            p(0.0, 1.0, 2.0),
        ];
        let n = newell_normal(&square).unwrap();
        let flat = project_to_plane(&square, &n);
        assert!((signed_area_2d(&flat) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bowtie_is_not_simple() {
        let bowtie = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(!is_simple_polygon_2d(&bowtie));
    }

    #[test]
    fn l_shape_is_simple() {
        let l = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(is_simple_polygon_2d(&l));
    }
}

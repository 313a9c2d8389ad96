use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{MeshError, ParseError, Result};
use crate::math::Point3;
use crate::mesh::{Polyhedron, SurfaceMesh};

use super::{create, open, parse_token};

/// Polygon soup as stored in an OFF file.
struct OffData {
    points: Vec<Point3>,
    faces: Vec<Vec<usize>>,
}

/// Writes `mesh` in OFF format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_off<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", mesh.vertex_count(), mesh.face_count())?;
    for p in &mesh.vertices {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in &mesh.faces {
        writeln!(writer, "3 {a} {b} {c}")?;
    }
    Ok(())
}

/// Writes `mesh` in OFF format to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_off_file(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    write_off(mesh, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), triangles = mesh.face_count(), "OFF written");
    Ok(())
}

/// Reads an OFF file that must contain only triangles.
///
/// # Errors
///
/// Returns [`MeshError::Empty`] for a file without faces,
/// [`MeshError::NotTriangleMesh`] for any polygon that is not a triangle,
/// a [`ParseError`] for malformed input, or an I/O error.
pub fn read_off<R: BufRead>(reader: R) -> Result<SurfaceMesh> {
    let data = parse(reader)?;
    if data.faces.is_empty() {
        return Err(MeshError::Empty.into());
    }
    let mut faces = Vec::with_capacity(data.faces.len());
    for (face, polygon) in data.faces.iter().enumerate() {
        let &[a, b, c] = polygon.as_slice() else {
            return Err(MeshError::NotTriangleMesh {
                face,
                arity: polygon.len(),
            }
            .into());
        };
        faces.push([index(a)?, index(b)?, index(c)?]);
    }
    Ok(SurfaceMesh::from_parts(data.points, faces)?)
}

/// Reads an OFF file from `path`.
///
/// # Errors
///
/// See [`read_off`].
pub fn read_off_file(path: impl AsRef<Path>) -> Result<SurfaceMesh> {
    read_off(open(path.as_ref())?)
}

/// Reads an OFF file of arbitrary polygons into a half-edge polyhedron.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input and a [`MeshError`] if the
/// polygons do not form an oriented manifold.
pub fn read_off_polyhedron<R: BufRead>(reader: R) -> Result<Polyhedron> {
    let data = parse(reader)?;
    Ok(Polyhedron::from_faces(&data.points, &data.faces)?)
}

/// Reads an OFF file from `path` into a half-edge polyhedron.
///
/// # Errors
///
/// See [`read_off_polyhedron`].
pub fn read_off_polyhedron_file(path: impl AsRef<Path>) -> Result<Polyhedron> {
    read_off_polyhedron(open(path.as_ref())?)
}

fn index(i: usize) -> Result<u32> {
    u32::try_from(i).map_err(|_| {
        MeshError::NonManifold(format!("vertex index {i} does not fit in 32 bits")).into()
    })
}

/// Parses the OFF header, vertex and face records. `#` starts a comment;
/// extra values after a record (colours) are ignored.
fn parse<R: BufRead>(reader: R) -> Result<OffData> {
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|l| (i + 1, l)))
        .filter(|line| {
            line.as_ref().map_or(true, |(_, l)| {
                let content = l.split('#').next().unwrap_or("");
                !content.trim().is_empty()
            })
        });
    let mut next_line = |what: &str| -> Result<(usize, String)> {
        match lines.next() {
            Some(line) => {
                let (number, text) = line?;
                let content = text.split('#').next().unwrap_or("").to_owned();
                Ok((number, content))
            }
            None => {
                let message = format!("unexpected end of file, expected {what}");
                Err(ParseError::new(0, message).into())
            }
        }
    };

    let (number, header) = next_line("`OFF` header")?;
    let mut tokens = header.split_whitespace();
    if tokens.next() != Some("OFF") {
        return Err(ParseError::new(number, "expected `OFF` header").into());
    }
    // Counts may follow the keyword on the same line.
    let rest: Vec<String> = tokens.map(str::to_owned).collect();
    let (number, counts) = if rest.is_empty() {
        next_line("element counts")?
    } else {
        (number, rest.join(" "))
    };
    let mut tokens = counts.split_whitespace();
    let vertex_count: usize = parse_token(tokens.next(), number, "vertex count")?;
    let face_count: usize = parse_token(tokens.next(), number, "face count")?;

    let mut points = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let (number, text) = next_line("vertex")?;
        let mut tokens = text.split_whitespace();
        let x: f64 = parse_token(tokens.next(), number, "x coordinate")?;
        let y: f64 = parse_token(tokens.next(), number, "y coordinate")?;
        let z: f64 = parse_token(tokens.next(), number, "z coordinate")?;
        points.push(Point3::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        let (number, text) = next_line("face")?;
        let mut tokens = text.split_whitespace();
        let arity: usize = parse_token(tokens.next(), number, "face arity")?;
        let polygon = (0..arity)
            .map(|_| parse_token(tokens.next(), number, "vertex index"))
            .collect::<Result<Vec<usize>, ParseError>>()?;
        faces.push(polygon);
    }

    debug!(vertices = points.len(), faces = faces.len(), "OFF read");
    Ok(OffData { points, faces })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SweepkitError;
    use crate::mesh::tests::tetrahedron;

    const QUAD: &str = "OFF
# unit square
4 1 0
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";

    #[test]
    fn round_trip_tetrahedron() {
        let mesh = tetrahedron();
        let mut buf = Vec::new();
        write_off(&mesh, &mut buf).unwrap();
        let back = read_off(buf.as_slice()).unwrap();
        assert_eq!(back.vertices, mesh.vertices);
        assert_eq!(back.faces, mesh.faces);
    }

    #[test]
    fn counts_on_header_line() {
        let text = "OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 255 0 0\n";
        let mesh = read_off(text.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn quad_is_not_a_triangle_mesh() {
        let err = read_off(QUAD.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SweepkitError::Mesh(MeshError::NotTriangleMesh { face: 0, arity: 4 })
        ));
    }

    #[test]
    fn quad_reads_as_polyhedron() {
        let poly = read_off_polyhedron(QUAD.as_bytes()).unwrap();
        assert_eq!(poly.face_count(), 1);
        assert!(!poly.is_pure_triangle());
        assert_eq!(poly.border_halfedge_count(), 4);
    }

    #[test]
    fn empty_mesh_rejected() {
        let text = "OFF\n0 0 0\n";
        assert!(matches!(
            read_off(text.as_bytes()),
            Err(SweepkitError::Mesh(MeshError::Empty))
        ));
    }

    #[test]
    fn malformed_vertex_reports_line() {
        let text = "OFF\n3 1 0\n0 0 0\n1 x 0\n0 1 0\n3 0 1 2\n";
        match read_off(text.as_bytes()) {
            Err(SweepkitError::Parse(e)) => assert_eq!(e.line, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_header_rejected() {
        assert!(read_off("3 1 0\n".as_bytes()).is_err());
    }
}

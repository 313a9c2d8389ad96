use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ParseError, Result};
use crate::math::{Point3, Vector3};
use crate::mesh::{triangle_normal, SurfaceMesh};

use super::{create, open, parse_token};

/// Writes `mesh` as ASCII STL under the solid name `name`.
///
/// Facet normals are the normalized cross product of the stored vertex
/// order, or zero for degenerate triangles. Coordinates use the shortest
/// representation that reads back to the same `f64`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_stl<W: Write>(mesh: &SurfaceMesh, name: &str, writer: &mut W) -> Result<()> {
    writeln!(writer, "solid {name}")?;
    for f in 0..mesh.face_count() {
        let tri = mesh.triangle(f);
        let n = triangle_normal(&tri).unwrap_or_else(Vector3::zeros);
        writeln!(writer, "  facet normal {} {} {}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in &tri {
            writeln!(writer, "      vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}

/// Writes `mesh` as ASCII STL to `path`, naming the solid after the file
/// stem.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_stl_file(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("sweepkit");
    let mut writer = create(path)?;
    write_stl(mesh, name, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), triangles = mesh.face_count(), "STL written");
    Ok(())
}

/// Reads an ASCII STL file into a mesh.
///
/// Vertices with bit-identical coordinates are merged, so a mesh written
/// by [`write_stl`] reads back with its shared vertices. Stored normals
/// are ignored.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the offending line for malformed input,
/// or an I/O error if reading fails.
pub fn read_stl<R: BufRead>(reader: R) -> Result<SurfaceMesh> {
    let mut mesh = SurfaceMesh::new();
    let mut welded: HashMap<[u64; 3], u32> = HashMap::new();
    let mut corners: Vec<u32> = Vec::with_capacity(3);
    let mut seen_solid = false;
    let mut last = 0;

    for (i, line) in reader.lines().enumerate() {
        let number = i + 1;
        last = number;
        let line = line?;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        match keyword {
            "solid" if !seen_solid => seen_solid = true,
            _ if !seen_solid => {
                return Err(ParseError::new(number, "expected `solid`").into());
            }
            "facet" | "outer" | "endfacet" => {}
            "vertex" => {
                let x: f64 = parse_token(tokens.next(), number, "x coordinate")?;
                let y: f64 = parse_token(tokens.next(), number, "y coordinate")?;
                let z: f64 = parse_token(tokens.next(), number, "z coordinate")?;
                // Adding zero folds -0.0 onto 0.0 before hashing.
                let key = [(x + 0.0).to_bits(), (y + 0.0).to_bits(), (z + 0.0).to_bits()];
                let index = *welded
                    .entry(key)
                    .or_insert_with(|| mesh.add_vertex(Point3::new(x, y, z)));
                corners.push(index);
            }
            "endloop" => {
                let [a, b, c] = corners[..] else {
                    return Err(ParseError::new(
                        number,
                        format!("facet has {} vertices, expected 3", corners.len()),
                    )
                    .into());
                };
                mesh.add_triangle(a, b, c);
                corners.clear();
            }
            "endsolid" => {
                debug!(
                    vertices = mesh.vertex_count(),
                    triangles = mesh.face_count(),
                    "STL read"
                );
                return Ok(mesh);
            }
            other => {
                return Err(ParseError::new(number, format!("unexpected `{other}`")).into());
            }
        }
    }
    Err(ParseError::new(last, "missing `endsolid`").into())
}

/// Reads an ASCII STL file from `path`.
///
/// # Errors
///
/// See [`read_stl`].
pub fn read_stl_file(path: impl AsRef<Path>) -> Result<SurfaceMesh> {
    read_stl(open(path.as_ref())?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SweepkitError;

    fn right_triangle() -> SurfaceMesh {
        SurfaceMesh::from_parts(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn unit_triangle_text() {
        let mut buf = Vec::new();
        write_stl(&right_triangle(), "tri", &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let expected = "solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";
        assert_eq!(text, expected);
    }

    #[test]
    fn round_trip_keeps_vertices_and_order() {
        let mesh = right_triangle();
        let mut buf = Vec::new();
        write_stl(&mesh, "tri", &mut buf).unwrap();
        let back = read_stl(buf.as_slice()).unwrap();
        assert_eq!(back.vertices, mesh.vertices);
        assert_eq!(back.faces, vec![[0, 1, 2]]);
        let n = back.face_normal(0).unwrap();
        assert!((n - Vector3::z()).norm() < 1e-15);
    }

    #[test]
    fn shared_vertices_are_welded() {
        let mesh = crate::mesh::tests::tetrahedron();
        let mut buf = Vec::new();
        write_stl(&mesh, "tet", &mut buf).unwrap();
        let back = read_stl(buf.as_slice()).unwrap();
        assert_eq!(back.vertex_count(), 4);
        assert!(back.is_closed());
        assert!((back.signed_volume() - 1.0 / 6.0).abs() < 1e-15);
    }

    #[test]
    fn degenerate_facet_gets_zero_normal() {
        let mesh = SurfaceMesh::from_parts(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let mut buf = Vec::new();
        write_stl(&mesh, "flat", &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("facet normal 0 0 0"));
    }

    #[test]
    fn bad_coordinate_reports_line() {
        let text = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 zero\n";
        match read_stl(text.as_bytes()) {
            Err(SweepkitError::Parse(e)) => assert_eq!(e.line, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_file_rejected() {
        let text = "solid x\n";
        assert!(matches!(read_stl(text.as_bytes()), Err(SweepkitError::Parse(_))));
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join("sweepkit_stl_round_trip.stl");
        write_stl_file(&right_triangle(), &path).unwrap();
        let back = read_stl_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.faces.len(), 1);
    }
}

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{MeshError, Result};
use crate::mesh::SurfaceMesh;

use super::create;

/// Writes `mesh` as ASCII PLY, with per-vertex colour when the mesh
/// carries one.
///
/// # Errors
///
/// Returns [`MeshError::NonManifold`] if the colour count differs from the
/// vertex count, or an I/O error if writing fails.
pub fn write_ply<W: Write>(mesh: &SurfaceMesh, writer: &mut W) -> Result<()> {
    let colors = mesh.colors.as_deref();
    if let Some(colors) = colors {
        if colors.len() != mesh.vertex_count() {
            return Err(MeshError::NonManifold(format!(
                "{} colours for {} vertices",
                colors.len(),
                mesh.vertex_count()
            ))
            .into());
        }
    }

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", mesh.vertex_count())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property double {axis}")?;
    }
    if colors.is_some() {
        for channel in ["red", "green", "blue"] {
            writeln!(writer, "property uchar {channel}")?;
        }
    }
    writeln!(writer, "element face {}", mesh.face_count())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for (i, p) in mesh.vertices.iter().enumerate() {
        match colors {
            Some(colors) => {
                let c = colors[i];
                writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, c.r, c.g, c.b)?;
            }
            None => writeln!(writer, "{} {} {}", p.x, p.y, p.z)?,
        }
    }
    for [a, b, c] in &mesh.faces {
        writeln!(writer, "3 {a} {b} {c}")?;
    }
    Ok(())
}

/// Writes `mesh` as ASCII PLY to `path`.
///
/// # Errors
///
/// See [`write_ply`].
pub fn write_ply_file(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create(path)?;
    write_ply(mesh, &mut writer)?;
    writer.flush()?;
    info!(
        path = %path.display(),
        triangles = mesh.face_count(),
        colored = mesh.colors.is_some(),
        "PLY written"
    );
    Ok(())
}

//! Wavefront OBJ-uitvoer.
//!
//! Formaat: een commentaarkop `# OBJ file`, per mesh een `o <naam>`-regel,
//! `v x y z` met vier decimalen en `f`-regels met 1-gebaseerde indices.
//! Meerdere meshes delen één vertexnummering; de indices van latere meshes
//! schuiven mee.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::MeshSink;
use crate::geom::{MeshData, MeshError};

/// Fouten tijdens het exporteren.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Schrijven naar de onderliggende writer is mislukt.
    #[error("schrijven mislukt: {0}")]
    Io(#[from] io::Error),
    /// De mesh is ongeldig (indices buiten bereik, NaN-coördinaten).
    #[error("mesh `{name}` is ongeldig: {source}")]
    InvalidMesh {
        name: String,
        #[source]
        source: MeshError,
    },
    /// Het doelbestand bestaat al en overschrijven is niet toegestaan.
    #[error("bestaand bestand {0} wordt niet overschreven (gebruik --overwrite)")]
    Exists(String),
}

/// Schrijft meshes als OBJ naar een willekeurige writer.
#[derive(Debug)]
pub struct ObjWriter<W: Write> {
    out: W,
    header_written: bool,
    vertex_offset: usize,
}

impl<W: Write> ObjWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
            vertex_offset: 0,
        }
    }

    /// Geeft de onderliggende writer terug.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.out, "# OBJ file")?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl<W: Write> MeshSink for ObjWriter<W> {
    type Error = ExportError;

    fn add_mesh(&mut self, name: &str, mesh: &MeshData) -> Result<(), Self::Error> {
        mesh.validate().map_err(|source| ExportError::InvalidMesh {
            name: name.to_owned(),
            source,
        })?;

        self.write_header()?;
        if !name.is_empty() {
            writeln!(self.out, "o {name}")?;
        }

        for p in &mesh.vertices {
            writeln!(self.out, "v {:.4} {:.4} {:.4}", p.x, p.y, p.z)?;
        }

        for face in &mesh.faces {
            write!(self.out, "f")?;
            for &i in face.indices() {
                write!(self.out, " {}", i as usize + self.vertex_offset + 1)?;
            }
            writeln!(self.out)?;
        }

        self.vertex_offset += mesh.vertex_count();
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.write_header()?;
        self.out.flush()?;
        Ok(())
    }
}

/// Rendert meshes als OBJ-tekst.
pub fn obj_string<'a>(
    meshes: impl IntoIterator<Item = (&'a str, &'a MeshData)>,
) -> Result<String, ExportError> {
    let mut writer = ObjWriter::new(Vec::new());
    for (name, mesh) in meshes {
        writer.add_mesh(name, mesh)?;
    }
    writer.finish()?;
    // Alle uitvoer is via `write!` met UTF-8 strings geschreven.
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Schrijft meshes als OBJ-bestand; weigert een bestaand bestand te
/// overschrijven tenzij `overwrite` gezet is.
pub fn write_obj_file<'a>(
    path: &Path,
    meshes: impl IntoIterator<Item = (&'a str, &'a MeshData)>,
    overwrite: bool,
) -> Result<(), ExportError> {
    if path.exists() && !overwrite {
        return Err(ExportError::Exists(path.display().to_string()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = ObjWriter::new(BufWriter::new(file));
    for (name, mesh) in meshes {
        writer.add_mesh(name, mesh)?;
    }
    writer.finish()?;
    log::debug!("OBJ geschreven naar {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Face, Point3};

    fn unit_quad() -> MeshData {
        MeshData::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::Quad([0, 1, 2, 3])],
        )
    }

    #[test]
    fn writes_vertices_with_four_decimals_and_one_based_faces() {
        let mesh = MeshData::new(
            vec![
                Point3::new(0.123456, 1.0, -2.5),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::Triangle([0, 1, 2])],
        );
        let text = obj_string([("", &mesh)]).expect("obj");
        assert_eq!(
            text,
            "# OBJ file\nv 0.1235 1.0000 -2.5000\nv 1.0000 0.0000 0.0000\nv 0.0000 1.0000 0.0000\nf 1 2 3\n"
        );
    }

    #[test]
    fn offsets_indices_of_later_meshes() {
        let quad = unit_quad();
        let text = obj_string([("a", &quad), ("b", &quad)]).expect("obj");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# OBJ file");
        assert_eq!(lines[1], "o a");
        assert!(lines.contains(&"f 1 2 3 4"));
        assert!(lines.contains(&"o b"));
        assert!(lines.contains(&"f 5 6 7 8"));
        assert_eq!(lines.iter().filter(|l| l.starts_with("v ")).count(), 8);
    }

    #[test]
    fn rejects_out_of_bounds_faces() {
        let mesh = MeshData::new(vec![Point3::ORIGIN], vec![Face::Triangle([0, 1, 2])]);
        let err = obj_string([("broken", &mesh)]).unwrap_err();
        assert!(matches!(err, ExportError::InvalidMesh { .. }));
    }

    #[test]
    fn empty_export_still_has_header() {
        let text = obj_string(std::iter::empty::<(&str, &MeshData)>()).expect("obj");
        assert_eq!(text, "# OBJ file\n");
    }
}

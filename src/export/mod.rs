//! Uitvoer van patch-meshes naar externe afnemers.
//!
//! Een [`MeshSink`] ontvangt benoemde [`MeshData`] en beslist zelf wat ermee
//! gebeurt: wegschrijven als OBJ ([`obj::ObjWriter`]), bewaren in het geheugen
//! ([`MeshCollector`]) of doorgeven aan een host-scène (de wasm-`Engine`).

pub mod obj;

use std::convert::Infallible;

use crate::geom::MeshData;

pub use obj::{ExportError, ObjWriter, obj_string, write_obj_file};

/// Afnemer van gegenereerde meshes.
pub trait MeshSink {
    type Error;

    /// Neem één mesh op onder de gegeven naam.
    fn add_mesh(&mut self, name: &str, mesh: &MeshData) -> Result<(), Self::Error>;

    /// Rond de uitvoer af (buffers legen, bestanden sluiten).
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Bewaart alle ontvangen meshes in het geheugen; handig zonder host-applicatie.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshCollector {
    pub meshes: Vec<(String, MeshData)>,
}

impl MeshCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MeshSink for MeshCollector {
    type Error = Infallible;

    fn add_mesh(&mut self, name: &str, mesh: &MeshData) -> Result<(), Self::Error> {
        self.meshes.push((name.to_owned(), mesh.clone()));
        Ok(())
    }
}

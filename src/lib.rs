#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod export;
pub mod geom;
pub mod parse;
pub mod pipeline;

use std::fmt;

use export::obj_string;
use geom::{Face, MeshData, Point3};
use pipeline::{PatchBatch, PatchOptions, PipelineError, build_patches};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // Tweede initialisatie (bijv. opnieuw laden van de module) is geen fout.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Mesh zoals de host hem ontvangt: platte vertexlijst en vlakindices.
#[derive(Debug, Serialize, Clone, PartialEq)]
struct MeshExport {
    vertices: Vec<[f64; 3]>,
    faces: Vec<Face>,
    patch_count: usize,
}

impl MeshExport {
    fn from_mesh(mesh: &MeshData, patch_count: usize) -> Self {
        Self {
            vertices: mesh.vertices.iter().map(|p| p.to_array()).collect(),
            faces: mesh.faces.clone(),
            patch_count,
        }
    }
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    options: PatchOptions,
    points: Vec<Point3>,
    batch: Option<PatchBatch>,
    dirty: bool,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            options: PatchOptions::default(),
            points: Vec::new(),
            batch: None,
            dirty: false,
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Stel de patch-instellingen in (`{ samplesPerCurve, triangulate, ... }`).
    /// Ontbrekende velden krijgen hun standaardwaarde.
    #[wasm_bindgen]
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: PatchOptions = serde_wasm_bindgen::from_value(options).map_err(to_js_error)?;
        self.configure(options).map_err(to_js_error)
    }

    /// Laad een puntenbestand (drie coördinaten per regel).
    #[wasm_bindgen]
    pub fn load_points(&mut self, text: &str) -> Result<(), JsValue> {
        let points = parse::points::parse_points(text).map_err(to_js_error)?;
        self.points = points;
        self.batch = None;
        self.dirty = true;
        Ok(())
    }

    /// Bouw de patches voor de geladen punten.
    #[wasm_bindgen]
    pub fn build(&mut self) -> Result<(), JsValue> {
        if !self.dirty && self.batch.is_some() {
            return Ok(());
        }
        if self.points.is_empty() {
            return Err(js_error("er zijn geen punten geladen"));
        }

        let batch = build_patches(&self.points, &self.options).map_err(to_js_error)?;
        debug_log!(
            "engine: {} patch(es) gebouwd uit {} punten",
            batch.patches.len(),
            self.points.len()
        );
        self.batch = Some(batch);
        self.dirty = false;
        Ok(())
    }

    /// Haal de samengevoegde mesh op als `{ vertices, faces, patch_count }`.
    #[wasm_bindgen]
    pub fn get_mesh(&self) -> Result<JsValue, JsValue> {
        let export = self.mesh_export().map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Exporteer alle patches als OBJ-tekst, één object per patch.
    #[wasm_bindgen]
    pub fn export_obj(&self) -> Result<String, JsValue> {
        self.obj_text().map_err(to_js_error)
    }

    /// Korte samenvatting van de diagnostiek van de laatste build.
    #[wasm_bindgen]
    pub fn diagnostics_summary(&self) -> Result<String, JsValue> {
        let batch = self.built().map_err(to_js_error)?;
        Ok(batch.diagnostics().summary())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Valideer en bewaar nieuwe instellingen; een volgende `build` rekent
    /// opnieuw.
    pub fn configure(&mut self, options: PatchOptions) -> Result<(), PipelineError> {
        options.validate()?;
        if options != self.options {
            self.options = options;
            self.dirty = true;
        }
        Ok(())
    }

    #[must_use]
    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Resultaat van de laatste build, indien aanwezig en actueel.
    #[must_use]
    pub fn batch(&self) -> Option<&PatchBatch> {
        if self.dirty { None } else { self.batch.as_ref() }
    }

    fn built(&self) -> Result<&PatchBatch, EngineError> {
        self.batch().ok_or(EngineError::NotBuilt)
    }

    fn mesh_export(&self) -> Result<MeshExport, EngineError> {
        let batch = self.built()?;
        let mesh = batch.merged_mesh().map_err(PipelineError::from)?;
        Ok(MeshExport::from_mesh(&mesh, batch.patches.len()))
    }

    fn obj_text(&self) -> Result<String, EngineError> {
        let batch = self.built()?;
        let count = batch.patches.len();
        let names: Vec<String> = (0..count)
            .map(|index| PatchBatch::patch_name("", index, count))
            .collect();
        let text = obj_string(
            names
                .iter()
                .map(String::as_str)
                .zip(batch.patches.iter().map(|patch| &patch.mesh)),
        )
        .map_err(PipelineError::from)?;
        Ok(text)
    }
}

#[derive(Debug, thiserror::Error)]
enum EngineError {
    #[error("er is nog geen patch gebouwd")]
    NotBuilt,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

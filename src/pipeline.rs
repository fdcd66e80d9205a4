//! Orkestratie van de patch-pipeline.
//!
//! Punten → randcurven → Coons-raster → mesh → diagnostiek. Alle stappen
//! lezen dezelfde [`PatchOptions`]; fouten uit elke laag komen samen in
//! [`PipelineError`].

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::{ExportError, MeshSink};
use crate::geom::{
    BoundaryError, BoundaryQuad, BoundarySet, CurveError, FaceTopology, MeshData, MeshError,
    PatchDiagnostics, PatchError, PatchGrid, PatchMetrics, Point3, TimingBucket, Tolerance,
    analyze_mesh, boundary_deviation, check_corners, coons_patch_grid_with_resolution,
    extract_boundary_sets,
};
use crate::parse::points::ParseError;

/// Instellingen voor het genereren van een patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatchOptions {
    /// Aantal samples per randcurve; tevens de zijde van het raster.
    pub samples_per_curve: usize,
    /// Driehoeken in plaats van vierhoeken.
    pub triangulate: bool,
    /// Maximale afstand tussen een curve-eindpunt en de bijbehorende hoek.
    pub corner_tolerance: f64,
    /// Curven en rasterrijen op de rayon-pool berekenen (alleen met de
    /// `parallel`-feature).
    pub parallel: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            samples_per_curve: Self::DEFAULT_SAMPLES,
            triangulate: true,
            corner_tolerance: Tolerance::LOOSE.eps,
            parallel: true,
        }
    }
}

impl PatchOptions {
    pub const DEFAULT_SAMPLES: usize = 100;
    pub const MIN_SAMPLES: usize = 2;
    /// S² vertexindices moeten in een `u32` passen.
    pub const MAX_SAMPLES: usize = 65_535;

    /// Controleer de instellingen voordat er iets berekend wordt.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(Self::MIN_SAMPLES..=Self::MAX_SAMPLES).contains(&self.samples_per_curve) {
            return Err(PipelineError::InvalidOptions(format!(
                "samplesPerCurve moet tussen {} en {} liggen, kreeg {}",
                Self::MIN_SAMPLES,
                Self::MAX_SAMPLES,
                self.samples_per_curve
            )));
        }
        if !self.tolerance().is_valid() {
            return Err(PipelineError::InvalidOptions(format!(
                "cornerTolerance moet eindig en niet-negatief zijn, kreeg {}",
                self.corner_tolerance
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.corner_tolerance)
    }

    #[must_use]
    pub fn topology(&self) -> FaceTopology {
        FaceTopology::from_triangulate(self.triangulate)
    }
}

/// Alle fouten die de pipeline kan opleveren.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ongeldige instellingen: {0}")]
    InvalidOptions(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    #[error(transparent)]
    Curve(#[from] CurveError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<Infallible> for PipelineError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Resultaat van één patch.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutput {
    pub quad: BoundaryQuad,
    pub grid: PatchGrid,
    pub mesh: MeshData,
    pub diagnostics: PatchDiagnostics,
}

/// Resultaat van een volledige puntenlijst (één patch per 16 punten).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchBatch {
    pub patches: Vec<PatchOutput>,
}

impl PatchBatch {
    /// Eén mesh met alle patches achter elkaar.
    pub fn merged_mesh(&self) -> Result<MeshData, MeshError> {
        MeshData::merge(self.patches.iter().map(|patch| patch.mesh.clone()))
    }

    /// Diagnostiek van alle patches samen.
    #[must_use]
    pub fn diagnostics(&self) -> PatchDiagnostics {
        let mut total = PatchDiagnostics::new();
        for patch in &self.patches {
            total.merge(&patch.diagnostics);
        }
        total
    }

    /// Naam van patch `index` bij export (`patch_0`, `patch_1`, ...), met
    /// optioneel een basisnaam ervoor.
    #[must_use]
    pub fn patch_name(base: &str, index: usize, count: usize) -> String {
        match (base.is_empty(), count) {
            (true, _) => format!("patch_{index}"),
            (false, 1) => base.to_owned(),
            (false, _) => format!("{base}_{index}"),
        }
    }
}

/// Bouw één Coons-patch uit vier randpolygonen.
///
/// De hoekpunten worden op de controlepolygonen gecontroleerd, dus vóór het
/// bemonsteren: een gebroken rand kost geen curve-evaluatie.
pub fn build_patch(set: &BoundarySet, options: &PatchOptions) -> Result<PatchOutput, PipelineError> {
    options.validate()?;
    let samples = options.samples_per_curve;
    check_corners(set.endpoints(), set.corners(), options.tolerance())?;
    let mut metrics = PatchMetrics::default();
    metrics.begin();

    let curves = metrics.time(TimingBucket::CurveEvaluation, || {
        set.sample(samples, options.parallel)
    })?;
    let quad = BoundaryQuad::with_corners(curves, set.corners(), options.tolerance())?;

    let grid = metrics.time(TimingBucket::PatchBlend, || {
        coons_patch_grid_with_resolution(&quad, samples, options.parallel)
    })?;

    let mesh = metrics.time(TimingBucket::Indexing, || {
        MeshData::from_grid(grid.clone(), options.topology())
    });

    let mut diagnostics = metrics.time(TimingBucket::Diagnostics, || {
        let mut diag = analyze_mesh(&mesh, Tolerance::default_geom());
        diag.max_boundary_deviation = boundary_deviation(&grid, &quad);
        diag
    });
    diagnostics.timing = metrics.end();

    log::debug!(
        "patch: {samples}x{samples} raster, {} vlakken, randafwijking {:.3e}",
        mesh.face_count(),
        diagnostics.max_boundary_deviation
    );

    Ok(PatchOutput {
        quad,
        grid,
        mesh,
        diagnostics,
    })
}

/// Bouw alle patches uit een platte puntenlijst.
pub fn build_patches(points: &[Point3], options: &PatchOptions) -> Result<PatchBatch, PipelineError> {
    options.validate()?;
    let sets = extract_boundary_sets(points)?;
    let patches = sets
        .iter()
        .map(|set| build_patch(set, options))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("{} patch(es) gebouwd", patches.len());
    Ok(PatchBatch { patches })
}

/// Stuur elke patch als eigen object naar `sink`.
pub fn run_to_sink<S>(batch: &PatchBatch, base_name: &str, sink: &mut S) -> Result<(), PipelineError>
where
    S: MeshSink,
    PipelineError: From<S::Error>,
{
    let count = batch.patches.len();
    for (index, patch) in batch.patches.iter().enumerate() {
        let name = PatchBatch::patch_name(base_name, index, count);
        sink.add_mesh(&name, &patch.mesh)?;
    }
    sink.finish()?;
    Ok(())
}

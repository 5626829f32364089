//! End-to-end generation: load, classify, resolve, synthesize, report, write.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{workers, CancellationToken, Pipeline, Stage};
use crate::classify::{classify, Classification};
use crate::context::ServiceContext;
use crate::error::{PipelineError, PipelineResult};
use crate::inventory::loader::{load_hints, load_inventory};
use crate::inventory::{Component, Hints, Inventory};
use crate::report::{
    compile, markdown, MigrationReport, RunMeta, REPORT_JSON, REPORT_MARKDOWN,
};
use crate::resolve::{resolve_component, ComponentResolution};
use crate::synth::{synthesize, synthesize_project, GeneratedArtifact};

/// Inputs of one `generate` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Inventory document path.
    pub inventory: PathBuf,
    /// Hints document path.
    pub hints: PathBuf,
    /// Output directory.
    pub out_dir: PathBuf,
    /// Worker threads for per-component stages; `1` runs sequentially.
    pub jobs: usize,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Tier per component, inventory order.
    pub classifications: Vec<Classification>,
    /// Mappings per component, inventory order.
    pub resolutions: Vec<ComponentResolution>,
    /// Artifacts in emission order; the project file is last.
    pub artifacts: Vec<GeneratedArtifact>,
    /// The compiled report.
    pub report: MigrationReport,
}

/// Loads the inputs, generates everything, and writes it under `out_dir`.
///
/// Nothing is written unless every stage up to the report succeeds.
/// Cancellation is checked one last time before the first write and is
/// ignored from then on, so output is either absent or complete.
///
/// # Errors
///
/// Returns the first fatal error. That is unreadable or invalid inputs, a
/// cancellation observed before writing began, or a failed write.
pub fn run(
    ctx: &ServiceContext,
    request: &GenerateRequest,
    cancel: &CancellationToken,
) -> PipelineResult<Generation> {
    let mut pipeline = Pipeline::new(cancel.clone());

    let hints = load_hints(ctx, &request.hints)?;
    let inventory = load_inventory(ctx, &request.inventory)?;
    info!(components = inventory.len(), project = %hints.project, "inventory loaded");
    pipeline.advance(Stage::Inventoried)?;

    let meta = RunMeta {
        run_id: ctx.id_gen.generate_id(),
        generated_at: ctx.clock.now(),
        project: hints.project.clone(),
    };
    let generation = generate(&mut pipeline, &inventory, &hints, request.jobs, &meta)?;

    pipeline.check_cancelled()?;
    write_outputs(ctx, &request.out_dir, &generation)?;
    pipeline.advance(Stage::Terminal)?;
    Ok(generation)
}

/// Runs the in-memory stages over a loaded inventory.
///
/// `pipeline` must be at [`Stage::Inventoried`] and is left at
/// [`Stage::Reported`].
///
/// # Errors
///
/// Returns an error if a stage is entered out of order or the run is
/// cancelled.
pub fn generate(
    pipeline: &mut Pipeline,
    inventory: &Inventory,
    hints: &Hints,
    jobs: usize,
    meta: &RunMeta,
) -> PipelineResult<Generation> {
    let components = inventory.components();

    let classifications = workers::map(jobs, components, classify);
    pipeline.advance(Stage::Classified)?;

    let classified: Vec<(&Component, &Classification)> =
        components.iter().zip(&classifications).collect();
    let resolutions = workers::map(jobs, &classified, |(component, classification)| {
        resolve_component(component, classification.tier, inventory, hints)
    });
    for warning in resolutions.iter().flat_map(|r| &r.warnings) {
        warn!(component = %warning.component, kind = warning.kind.as_str(), "{}", warning.message);
    }
    pipeline.advance(Stage::Resolved)?;

    let resolved: Vec<(&Component, &Classification, &ComponentResolution)> = classified
        .iter()
        .zip(&resolutions)
        .map(|((component, classification), resolution)| {
            (*component, *classification, resolution)
        })
        .collect();
    let mut artifacts: Vec<GeneratedArtifact> =
        workers::map(jobs, &resolved, |(component, classification, resolution)| {
            synthesize(component, classification.tier, resolution)
        })
        .into_iter()
        .flatten()
        .collect();
    artifacts.push(synthesize_project(hints));
    pipeline.advance(Stage::Synthesized)?;

    let report = compile(inventory, &classifications, &resolutions, &artifacts, meta);
    info!(
        artifacts = report.summary.artifacts_total,
        limitations = report.limitations.len(),
        "report compiled"
    );
    pipeline.advance(Stage::Reported)?;

    Ok(Generation {
        classifications,
        resolutions,
        artifacts,
        report,
    })
}

/// Writes every artifact plus both report renderings under `out_dir`.
///
/// Artifacts listed by the report of a previous run in `out_dir` that this
/// run no longer produces are removed afterwards. Other files are left alone.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized or a file cannot be
/// written or removed.
pub fn write_outputs(
    ctx: &ServiceContext,
    out_dir: &Path,
    generation: &Generation,
) -> PipelineResult<()> {
    let json = generation.report.to_json()?;
    let stale = stale_artifacts(ctx, out_dir, &generation.report);
    for artifact in &generation.artifacts {
        write(ctx, &out_dir.join(artifact.target_path()), artifact.body())?;
    }
    write(ctx, &out_dir.join(REPORT_JSON), &json)?;
    write(
        ctx,
        &out_dir.join(REPORT_MARKDOWN),
        &markdown::render(&generation.report),
    )?;
    for path in &stale {
        let path = out_dir.join(path);
        ctx.fs.remove(&path).map_err(|e| PipelineError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }
    info!(
        out_dir = %out_dir.display(),
        files = generation.artifacts.len() + 2,
        removed = stale.len(),
        "output written"
    );
    Ok(())
}

fn write(ctx: &ServiceContext, path: &Path, contents: &str) -> PipelineResult<()> {
    ctx.fs.write(path, contents).map_err(|e| PipelineError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Artifact paths the previous report in `out_dir` lists that `report` no
/// longer does. Only plain relative paths are returned.
fn stale_artifacts(ctx: &ServiceContext, out_dir: &Path, report: &MigrationReport) -> Vec<PathBuf> {
    let previous = match previous_report(ctx, out_dir) {
        Ok(Some(previous)) => previous,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "previous report unreadable, stale artifacts kept");
            return Vec::new();
        }
    };
    let current: HashSet<&str> = report
        .artifacts
        .iter()
        .map(|a| a.target_path.as_str())
        .collect();
    previous
        .artifacts
        .iter()
        .filter(|a| !current.contains(a.target_path.as_str()))
        .map(|a| PathBuf::from(&a.target_path))
        .filter(|path| {
            path.components()
                .all(|c| matches!(c, std::path::Component::Normal(_)))
        })
        .collect()
}

/// Reads the report a previous run left in `out_dir`, if there is one.
///
/// # Errors
///
/// Returns an error if a report exists but cannot be read or parsed.
pub fn previous_report(
    ctx: &ServiceContext,
    out_dir: &Path,
) -> PipelineResult<Option<MigrationReport>> {
    let path = out_dir.join(REPORT_JSON);
    if !ctx.fs.exists(&path) {
        return Ok(None);
    }
    let display = path.display().to_string();
    let contents = ctx
        .fs
        .read_to_string(&path)
        .map_err(|e| PipelineError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PipelineError::Parse {
            path: display,
            message: e.to_string(),
        })
}

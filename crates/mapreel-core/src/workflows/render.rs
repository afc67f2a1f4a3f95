use crate::core::contour::{self, ContourLevel, ContourMethod};
use crate::core::io::mrc::MrcFile;
use crate::core::io::traits::VolumeFile;
use crate::core::script::writer::ScriptWriter;
use crate::engine::builder::ScriptBuilder;
use crate::engine::config::{RenderConfig, RenderMode};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::runner::ChimeraX;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tracing::{info, instrument};

/// What one render mode produced.
#[derive(Debug, Clone)]
pub struct ModeOutcome {
    pub mode: RenderMode,
    pub script_path: PathBuf,
    pub artifact_path: PathBuf,
    pub session_path: Option<PathBuf>,
    /// `None` when the script was written but not executed.
    pub exit_status: Option<ExitStatus>,
}

/// Determines the contour level for a run.
///
/// An explicit level wins over any method. The map is only read when the
/// method actually needs voxel statistics.
#[instrument(skip_all, name = "contour_estimation")]
pub fn resolve_contour(
    map_path: &Path,
    explicit: Option<f64>,
    method: ContourMethod,
    reporter: &ProgressReporter,
) -> Result<ContourLevel, EngineError> {
    if let Some(level) = explicit {
        info!("Using explicit contour level {}", level);
        return Ok(ContourLevel::Explicit(level));
    }
    if !method.requires_samples() {
        info!("Deferring contour level to ChimeraX ({})", method);
        return Ok(ContourLevel::Deferred);
    }

    reporter.report(Progress::PhaseStart {
        name: "Estimating contour level",
    });
    let (samples, _) = MrcFile::read_from_path(map_path).map_err(|source| EngineError::MapLoad {
        path: map_path.to_path_buf(),
        source,
    })?;
    let level = contour::estimate(method, Some(&samples))?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Estimated contour level {} using '{}' over {} voxels",
        level,
        method,
        samples.len()
    );
    Ok(level)
}

fn phase_name(mode: RenderMode, engine: Option<&ChimeraX>) -> &'static str {
    match (mode, engine.is_some()) {
        (RenderMode::Movie, true) => "Rendering movie",
        (RenderMode::Movie, false) => "Writing movie script",
        (RenderMode::Image, true) => "Rendering image",
        (RenderMode::Image, false) => "Writing image script",
    }
}

/// Builds, writes and optionally executes one script per selected mode.
///
/// Modes run sequentially, movie before image. Each engine invocation blocks
/// until ChimeraX exits.
#[instrument(skip_all, name = "render_workflow")]
pub fn run(
    config: &RenderConfig,
    engine: Option<&ChimeraX>,
    reporter: &ProgressReporter,
) -> Result<Vec<ModeOutcome>, EngineError> {
    let builder = ScriptBuilder::new(config);
    let mut outcomes = Vec::with_capacity(config.format.modes().len());

    for &mode in config.format.modes() {
        reporter.report(Progress::PhaseStart {
            name: phase_name(mode, engine),
        });

        let outputs = config.outputs(mode);
        let script = builder.build(mode)?;
        let script_path = ScriptWriter::write(&script, &outputs.artifact)?;
        info!("{} script written to {}", mode, script_path.display());
        reporter.report(Progress::Message(format!(
            "{} script → {}",
            mode,
            script_path.display()
        )));

        let exit_status = match engine {
            Some(engine) => Some(engine.run_script(&script_path)?),
            None => None,
        };

        reporter.report(Progress::PhaseFinish);
        outcomes.push(ModeOutcome {
            mode,
            script_path,
            artifact_path: outputs.artifact,
            session_path: config.save_session.then_some(outputs.session),
            exit_status,
        });
    }

    Ok(outcomes)
}

use mapreel::core::contour::ContourMethod;
use mapreel::core::script::schemes::{ColorScheme, QualityPreset};
use mapreel::engine::config::{BackgroundColor, OutputFormat};
use std::path::PathBuf;

/// Merged settings for one `render` invocation.
///
/// Input paths are exactly as given; decompression and absolutization happen
/// when the run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub map_input: PathBuf,
    pub model_input: Option<PathBuf>,
    pub explicit_contour: Option<f64>,
    pub contour_method: ContourMethod,
    pub format: OutputFormat,
    pub quality: QualityPreset,
    pub colour: ColorScheme,
    pub background: BackgroundColor,
    pub transparent: bool,
    pub save_session: bool,
    pub exit_after_run: bool,
    pub outdir: Option<PathBuf>,
    pub outname: Option<String>,
    pub engine: EngineSelection,
}

/// How the ChimeraX executable is chosen, if at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSelection {
    /// Scripts are written but never run.
    ScriptOnly,
    /// Look the executable up and fail early when it is missing.
    Checked { executable: Option<PathBuf> },
    /// Run whatever name was given without checking that it exists.
    Unchecked { executable: Option<PathBuf> },
}

use crate::error::{CliError, Result};
use mapreel::core::contour::ContourMethod;
use mapreel::core::script::schemes::{ColorScheme, QualityPreset};
use mapreel::engine::config::{BackgroundColor, OutputFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileContourConfig {
    pub method: Option<ContourMethod>,
    pub level: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileRenderConfig {
    pub format: Option<OutputFormat>,
    pub quality: Option<QualityPreset>,
    #[serde(alias = "color")]
    pub colour: Option<ColorScheme>,
    pub background: Option<BackgroundColor>,
    pub transparent: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOutputConfig {
    pub outdir: Option<PathBuf>,
    pub outname: Option<String>,
    pub save_session: Option<bool>,
    pub exit: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub contour: Option<FileContourConfig>,
    pub render: Option<FileRenderConfig>,
    pub output: Option<FileOutputConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

use super::config::ConfigError;
use crate::core::contour::ContourError;
use crate::core::io::mrc::MrcError;
use crate::core::script::writer::ScriptIoError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Contour estimation failed: {0}")]
    Contour(#[from] ContourError),

    #[error("Failed to load density map '{path}': {source}", path = path.display())]
    MapLoad {
        path: PathBuf,
        #[source]
        source: MrcError,
    },

    #[error(transparent)]
    Script(#[from] ScriptIoError),

    #[error(
        "ChimeraX executable '{name}' not found. Install ChimeraX, add it to PATH, or set {env_var}"
    )]
    EngineUnavailable {
        name: String,
        env_var: &'static str,
    },

    #[error("Failed to launch '{program}': {source}", program = program.display())]
    EngineLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

use super::command::CommandScript;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const SCRIPT_SUFFIX: &str = "_script.cxc";

#[derive(Debug, Error)]
pub enum ScriptIoError {
    #[error("Output path '{path}' has no file name", path = path.display())]
    NoFileName { path: PathBuf },
    #[error("Failed to write script '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read script '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub struct ScriptWriter;

impl ScriptWriter {
    /// Returns `<dir>/<stem>_script.cxc` for an output artifact at `<dir>/<stem>.<ext>`.
    pub fn script_path_for(output_path: &Path) -> Result<PathBuf, ScriptIoError> {
        let stem = output_path
            .file_stem()
            .ok_or_else(|| ScriptIoError::NoFileName {
                path: output_path.to_path_buf(),
            })?;
        let mut file_name = stem.to_os_string();
        file_name.push(SCRIPT_SUFFIX);
        Ok(output_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(file_name))
    }

    /// Writes `script` alongside `output_path` and returns the script's path.
    /// An existing file at that path is overwritten.
    pub fn write(script: &CommandScript, output_path: &Path) -> Result<PathBuf, ScriptIoError> {
        let script_path = Self::script_path_for(output_path)?;
        fs::write(&script_path, script.to_text()).map_err(|source| ScriptIoError::Write {
            path: script_path.clone(),
            source,
        })?;
        debug!(
            "Wrote {} command(s) to {}",
            script.len(),
            script_path.display()
        );
        Ok(script_path)
    }

    pub fn read(script_path: &Path) -> Result<Vec<String>, ScriptIoError> {
        let content = fs::read_to_string(script_path).map_err(|source| ScriptIoError::Read {
            path: script_path.to_path_buf(),
            source,
        })?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        Ok(content.split('\n').map(str::to_string).collect())
    }
}

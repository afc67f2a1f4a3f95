use super::error::EngineError;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info, warn};

/// Environment variable that overrides the ChimeraX executable.
pub const ENGINE_ENV_VAR: &str = "MAPREEL_CHIMERAX";
pub const DEFAULT_EXECUTABLE: &str = "chimerax";

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn candidate_names(name: &OsStr) -> Vec<OsString> {
    let mut names = vec![name.to_os_string()];
    if cfg!(windows) && Path::new(name).extension().is_none() {
        let mut exe = name.to_os_string();
        exe.push(".exe");
        names.push(exe);
    }
    names
}

fn find_in_path(name: &OsStr, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var).find_map(|dir| {
        candidate_names(name)
            .into_iter()
            .map(|n| dir.join(n))
            .find(|candidate| is_executable(candidate))
    })
}

/// Handle on a ChimeraX installation that can execute command scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChimeraX {
    executable: PathBuf,
}

impl ChimeraX {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Locates ChimeraX using `MAPREEL_CHIMERAX` and the process `PATH`.
    pub fn discover() -> Result<Self, EngineError> {
        Self::locate(
            env::var_os(ENGINE_ENV_VAR).as_deref(),
            env::var_os("PATH").as_deref(),
        )
    }

    /// Resolves the executable from an optional override and a `PATH`-style list.
    ///
    /// An override containing a path separator must point at an executable file;
    /// a bare override name is searched for on `path_var` like the default name.
    pub fn locate(
        override_name: Option<&OsStr>,
        path_var: Option<&OsStr>,
    ) -> Result<Self, EngineError> {
        let name = override_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| OsStr::new(DEFAULT_EXECUTABLE));
        let as_path = Path::new(name);

        let found = if as_path.components().count() > 1 {
            is_executable(as_path).then(|| as_path.to_path_buf())
        } else {
            path_var.and_then(|p| find_in_path(name, p))
        };

        match found {
            Some(executable) => {
                debug!("Found ChimeraX at {}", executable.display());
                Ok(Self { executable })
            }
            None => Err(EngineError::EngineUnavailable {
                name: name.to_string_lossy().into_owned(),
                env_var: ENGINE_ENV_VAR,
            }),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn command(&self, script_path: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command.arg("--script").arg(script_path);
        command
    }

    /// Runs `script_path` and blocks until ChimeraX exits.
    ///
    /// Standard streams are inherited. A non-zero exit status is logged and
    /// returned, not treated as an error.
    pub fn run_script(&self, script_path: &Path) -> Result<ExitStatus, EngineError> {
        info!(
            "Running {} --script {}",
            self.executable.display(),
            script_path.display()
        );
        let status = self
            .command(script_path)
            .status()
            .map_err(|source| EngineError::EngineLaunch {
                program: self.executable.clone(),
                source,
            })?;
        if !status.success() {
            warn!("ChimeraX exited with {}", status);
        }
        Ok(status)
    }
}

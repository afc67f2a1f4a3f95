use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{
    Layer, Registry,
    filter::LevelFilter,
    fmt::{self, MakeWriter},
    prelude::*,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A log file always records at least this level, even under `-q`.
const FILE_LEVEL_FLOOR: LevelFilter = LevelFilter::DEBUG;

/// Where log output goes, and how much of it each destination receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTargets {
    pub console: LevelFilter,
    pub file: Option<(PathBuf, LevelFilter)>,
}

impl LogTargets {
    /// Resolves `-v` (count), `-q` and `--log-file`. Warnings reach the
    /// console by default.
    pub fn from_flags(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Self {
        let console = if quiet {
            LevelFilter::OFF
        } else {
            match verbosity {
                0 => LevelFilter::WARN,
                1 => LevelFilter::INFO,
                2 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        };
        let file = log_file.map(|path| (path, console.max(FILE_LEVEL_FLOOR)));
        Self { console, file }
    }

    fn layers(&self) -> Result<Vec<BoxedLayer>> {
        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .compact()
            .with_filter(self.console)
            .boxed();

        let mut layers = vec![console];
        if let Some((path, level)) = &self.file {
            let file = File::create(path).map_err(CliError::Io)?;
            layers.push(file_layer(file, *level));
        }
        Ok(layers)
    }
}

/// Plain-text layer for `--log-file`: no ANSI escapes, with targets and thread ids.
fn file_layer<W>(writer: W, level: LevelFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(level)
        .boxed()
}

/// Installs the global subscriber for this process.
pub fn setup_logging(targets: LogTargets) -> Result<()> {
    tracing_subscriber::registry()
        .with(targets.layers()?)
        .init();

    match &targets.file {
        Some((path, level)) => debug!(
            "Console logging at {}, file logging at {} to {}",
            targets.console,
            level,
            path.display()
        ),
        None => debug!("Console logging at {}", targets.console),
    }
    Ok(())
}

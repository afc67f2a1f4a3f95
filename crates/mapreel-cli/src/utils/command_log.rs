use mapreel::core::utils::quoting::shell_quote;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

const HEADER: &str = "Command used to run this script:";

/// Renders `args` as a single shell-safe command line.
pub fn format_invocation<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| shell_quote(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_command_log<S: AsRef<str>>(path: &Path, args: &[S]) -> io::Result<()> {
    fs::write(path, format!("{}\n{}\n", HEADER, format_invocation(args)))
}

/// Like [`write_command_log`], but a failure only produces a warning.
pub fn record_invocation<S: AsRef<str>>(path: &Path, args: &[S]) {
    match write_command_log(path, args) {
        Ok(()) => debug!("Command log written to {}", path.display()),
        Err(e) => warn!("Could not write command log {}: {}", path.display(), e),
    }
}

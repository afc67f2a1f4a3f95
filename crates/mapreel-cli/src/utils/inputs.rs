use crate::error::{CliError, Result};
use flate2::read::GzDecoder;
use mapreel::core::io::traits::is_gzip_path;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An input file ready to hand to ChimeraX.
///
/// Gzip-compressed inputs are expanded next to the original with the `.gz`
/// extension stripped. The expanded copy is removed when the value is dropped,
/// so it disappears on both success and error paths.
#[derive(Debug)]
pub struct PreparedInput {
    path: PathBuf,
    temporary: bool,
}

impl PreparedInput {
    pub fn prepare(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)?;
        if !path.is_file() {
            return Err(CliError::Argument(format!(
                "Input file does not exist: {}",
                path.display()
            )));
        }
        if !is_gzip_path(&path) {
            return Ok(Self {
                path,
                temporary: false,
            });
        }

        let target = path.with_extension("");
        if target.exists() {
            return Err(CliError::Argument(format!(
                "Cannot decompress '{}': '{}' already exists.",
                path.display(),
                target.display()
            )));
        }

        info!("Decompressing {} → {}", path.display(), target.display());
        if let Err(e) = decompress(&path, &target) {
            // Never leave a half-written sibling behind.
            let _ = fs::remove_file(&target);
            return Err(CliError::FileParsing {
                path,
                source: e.into(),
            });
        }

        Ok(Self {
            path: target,
            temporary: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl Drop for PreparedInput {
    fn drop(&mut self) {
        if !self.temporary {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary file {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

fn decompress(source: &Path, target: &Path) -> io::Result<()> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(source)?));
    let mut writer = BufWriter::new(File::create_new(target)?);
    io::copy(&mut decoder, &mut writer)?;
    writer.flush()
}

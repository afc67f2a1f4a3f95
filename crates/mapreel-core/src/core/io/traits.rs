use crate::core::volume::samples::VolumeSamples;
use flate2::read::GzDecoder;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Defines the interface for reading volumetric density map formats.
///
/// Implementors handle format-specific header parsing and voxel decoding and
/// return the full grid as [`VolumeSamples`].
pub trait VolumeFile {
    /// The header metadata associated with the file format.
    type Header;

    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads a complete volume from a reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The reader positioned at the start of the file.
    ///
    /// # Return
    ///
    /// Returns the decoded voxel grid and the parsed header.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not a valid instance of the format or
    /// if the underlying reader fails.
    fn read_from(reader: &mut impl Read) -> Result<(VolumeSamples, Self::Header), Self::Error>;

    /// Reads a complete volume from a file path.
    ///
    /// Paths ending in `.gz` are decompressed on the fly.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the file to read.
    ///
    /// # Return
    ///
    /// Returns the decoded voxel grid and the parsed header.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(VolumeSamples, Self::Header), Self::Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        if is_gzip_path(path) {
            let mut reader = BufReader::new(GzDecoder::new(file));
            Self::read_from(&mut reader)
        } else {
            let mut reader = BufReader::new(file);
            Self::read_from(&mut reader)
        }
    }
}

/// Returns `true` if the path carries a `.gz` extension (case-insensitive).
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

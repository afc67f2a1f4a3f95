use crate::core::io::traits::VolumeFile;
use crate::core::volume::samples::{VolumeError, VolumeSamples};
use half::f16;
use std::io::{self, Read};
use thiserror::Error;
use tracing::debug;

const HEADER_LEN: usize = 1024;
const MAP_MAGIC: &[u8; 4] = b"MAP ";
const MAGIC_OFFSET: usize = 208;
const MACHINE_STAMP_OFFSET: usize = 212;
// Upper bound on the up-front voxel buffer; larger maps grow it as bytes arrive.
const INITIAL_DATA_CAPACITY: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MrcError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("File is not an MRC/CCP4 map (missing 'MAP ' identifier)")]
    NotMrc,
    #[error("File is truncated: {0}")]
    Truncated(&'static str),
    #[error("Invalid grid dimensions {nx}x{ny}x{nz}")]
    InvalidDimensions { nx: i32, ny: i32, nz: i32 },
    #[error("Grid {nx}x{ny}x{nz} is too large to address")]
    TooLarge { nx: usize, ny: usize, nz: usize },
    #[error("Invalid extended header length: {0}")]
    InvalidExtendedHeader(i32),
    #[error("Unsupported MRC data mode: {0}")]
    UnsupportedMode(i32),
    #[error("Invalid volume: {0}")]
    Volume(#[from] VolumeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

/// Voxel storage modes understood by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MrcMode {
    Int8,
    Int16,
    Float32,
    UInt16,
    Float16,
}

impl MrcMode {
    fn from_code(code: i32) -> Result<Self, MrcError> {
        match code {
            0 => Ok(Self::Int8),
            1 => Ok(Self::Int16),
            2 => Ok(Self::Float32),
            6 => Ok(Self::UInt16),
            12 => Ok(Self::Float16),
            other => Err(MrcError::UnsupportedMode(other)),
        }
    }

    pub fn bytes_per_voxel(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 => 2,
            Self::Float32 => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MrcHeader {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub mode: MrcMode,
    pub endianness: Endianness,
    pub extended_header_len: usize,
    /// Summary statistics as recorded by the writer; they may be stale.
    pub dmin: f32,
    pub dmax: f32,
    pub dmean: f32,
    pub rms: f32,
}

impl MrcHeader {
    fn parse(raw: &[u8; HEADER_LEN]) -> Result<Self, MrcError> {
        if &raw[MAGIC_OFFSET..MAGIC_OFFSET + 4] != MAP_MAGIC {
            return Err(MrcError::NotMrc);
        }

        let endianness = match raw[MACHINE_STAMP_OFFSET] {
            0x11 => Endianness::Big,
            _ => Endianness::Little,
        };
        let word_i32 = |index: usize| {
            let bytes = [
                raw[index * 4],
                raw[index * 4 + 1],
                raw[index * 4 + 2],
                raw[index * 4 + 3],
            ];
            match endianness {
                Endianness::Little => i32::from_le_bytes(bytes),
                Endianness::Big => i32::from_be_bytes(bytes),
            }
        };
        let word_f32 = |index: usize| f32::from_bits(word_i32(index) as u32);

        let (nx, ny, nz) = (word_i32(0), word_i32(1), word_i32(2));
        if nx <= 0 || ny <= 0 || nz <= 0 {
            return Err(MrcError::InvalidDimensions { nx, ny, nz });
        }
        let mode = MrcMode::from_code(word_i32(3))?;
        let nsymbt = word_i32(23);
        if nsymbt < 0 {
            return Err(MrcError::InvalidExtendedHeader(nsymbt));
        }

        Ok(Self {
            nx: nx as usize,
            ny: ny as usize,
            nz: nz as usize,
            mode,
            endianness,
            extended_header_len: nsymbt as usize,
            dmin: word_f32(19),
            dmax: word_f32(20),
            dmean: word_f32(21),
            rms: word_f32(54),
        })
    }

    /// `None` when the product overflows `usize`.
    pub fn voxel_count(&self) -> Option<usize> {
        self.nx.checked_mul(self.ny)?.checked_mul(self.nz)
    }

    /// Byte length of the voxel block, or [`MrcError::TooLarge`] on overflow.
    pub fn data_len(&self) -> Result<usize, MrcError> {
        self.voxel_count()
            .and_then(|n| n.checked_mul(self.mode.bytes_per_voxel()))
            .ok_or(MrcError::TooLarge {
                nx: self.nx,
                ny: self.ny,
                nz: self.nz,
            })
    }
}

fn decode_voxels(data: &[u8], mode: MrcMode, endianness: Endianness) -> Vec<f32> {
    let little = endianness == Endianness::Little;
    match mode {
        MrcMode::Int8 => data.iter().map(|&b| f32::from(b as i8)).collect(),
        MrcMode::Int16 => data
            .chunks_exact(2)
            .map(|c| {
                let bytes = [c[0], c[1]];
                f32::from(if little {
                    i16::from_le_bytes(bytes)
                } else {
                    i16::from_be_bytes(bytes)
                })
            })
            .collect(),
        MrcMode::UInt16 => data
            .chunks_exact(2)
            .map(|c| {
                let bytes = [c[0], c[1]];
                f32::from(if little {
                    u16::from_le_bytes(bytes)
                } else {
                    u16::from_be_bytes(bytes)
                })
            })
            .collect(),
        MrcMode::Float16 => data
            .chunks_exact(2)
            .map(|c| {
                let bytes = [c[0], c[1]];
                if little {
                    f16::from_le_bytes(bytes).to_f32()
                } else {
                    f16::from_be_bytes(bytes).to_f32()
                }
            })
            .collect(),
        MrcMode::Float32 => data
            .chunks_exact(4)
            .map(|c| {
                let bytes = [c[0], c[1], c[2], c[3]];
                if little {
                    f32::from_le_bytes(bytes)
                } else {
                    f32::from_be_bytes(bytes)
                }
            })
            .collect(),
    }
}

fn read_exact_or_truncated(
    reader: &mut impl Read,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), MrcError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => MrcError::Truncated(what),
        _ => MrcError::Io(e),
    })
}

/// Reader for MRC2014 / CCP4 density maps.
pub struct MrcFile;

impl VolumeFile for MrcFile {
    type Header = MrcHeader;
    type Error = MrcError;

    fn read_from(reader: &mut impl Read) -> Result<(VolumeSamples, Self::Header), Self::Error> {
        let mut raw = [0u8; HEADER_LEN];
        read_exact_or_truncated(reader, &mut raw, "header")?;
        let header = MrcHeader::parse(&raw)?;
        debug!(
            "MRC header: {}x{}x{} voxels, mode {:?}, {:?} endian, {} byte extended header",
            header.nx,
            header.ny,
            header.nz,
            header.mode,
            header.endianness,
            header.extended_header_len
        );

        let skipped = io::copy(
            &mut reader.by_ref().take(header.extended_header_len as u64),
            &mut io::sink(),
        )?;
        if skipped != header.extended_header_len as u64 {
            return Err(MrcError::Truncated("extended header"));
        }

        let data_len = header.data_len()?;
        let mut data = Vec::with_capacity(data_len.min(INITIAL_DATA_CAPACITY));
        reader.by_ref().take(data_len as u64).read_to_end(&mut data)?;
        if data.len() != data_len {
            return Err(MrcError::Truncated("voxel data"));
        }

        let values = decode_voxels(&data, header.mode, header.endianness);
        let samples = VolumeSamples::new([header.nx, header.ny, header.nz], values)?;
        Ok((samples, header))
    }
}

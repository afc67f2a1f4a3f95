//! Provides input functionality for volumetric density map formats.
//!
//! Readers implement the [`traits::VolumeFile`] trait, which yields a
//! [`VolumeSamples`](crate::core::volume::samples::VolumeSamples) grid together with
//! format-specific header metadata. Gzip-compressed inputs are decoded transparently
//! when read through a path.

pub mod mrc;
pub mod traits;

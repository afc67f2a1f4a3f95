//! Voxel containers and the scalar reductions used for contour estimation.
//!
//! A [`samples::VolumeSamples`] holds every voxel of a density map exactly once,
//! in file order. All statistics are computed over the full grid; there is no
//! masking or region-of-interest selection.

pub mod samples;

//! # Core Module
//!
//! Stateless building blocks shared by the engine and workflows.
//!
//! - **Voxel data** ([`volume`]) - The immutable sample grid and its reductions
//! - **File I/O** ([`io`]) - MRC/CCP4 map reading, including gzip-compressed files
//! - **Thresholds** ([`contour`]) - Statistical contour-level strategies
//! - **Scripts** ([`script`]) - ChimeraX command vocabulary, color/quality tables, script files
//! - **Utilities** ([`utils`]) - Shell quoting of paths embedded in commands

pub mod contour;
pub mod io;
pub mod script;
pub mod utils;
pub mod volume;

//! # mapreel Core Library
//!
//! Turns a cryo-EM density map, optionally paired with an atomic model, into a
//! reproducible ChimeraX command script for a still image or a turntable movie.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: the voxel grid and its
//!   statistics (`volume`), the MRC reader (`io`), the contour estimators (`contour`),
//!   and the ChimeraX command vocabulary with its lookup tables (`script`).
//!
//! - **[`engine`]: The Logic Core.** Resolved render configuration, the
//!   `ScriptBuilder` that turns it into an ordered command sequence, and the
//!   `ChimeraX` runner that executes a script.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together: estimate a
//!   contour level, then build, write and optionally execute one script per mode.

pub mod core;
pub mod engine;
pub mod workflows;

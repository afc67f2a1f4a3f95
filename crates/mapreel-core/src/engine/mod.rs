//! # Engine Module
//!
//! Turns a resolved [`config::RenderConfig`] into ChimeraX command scripts and runs them.
//!
//! - **Configuration** ([`config`]) - Render settings, output naming, and their builder
//! - **Script assembly** ([`builder`]) - The ordered command sequence for image and movie modes
//! - **Execution** ([`runner`]) - Locating ChimeraX and running a script to completion
//! - **Progress Monitoring** ([`progress`]) - Phase events for user feedback
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod builder;
pub mod config;
pub mod error;
pub mod progress;
pub mod runner;

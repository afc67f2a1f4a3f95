//! # Workflows Module
//!
//! Top-level entry points. The render workflow ([`render`]) estimates the contour
//! level and then builds, writes and optionally executes one script per selected
//! output mode.

pub mod render;

//! ChimeraX command scripts: the command vocabulary, the color and quality
//! lookup tables, and persistence of a finished script to disk.

pub mod command;
pub mod schemes;
pub mod writer;

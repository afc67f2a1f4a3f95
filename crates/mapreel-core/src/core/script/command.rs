use crate::core::utils::quoting::shell_quote;
use std::fmt;
use std::path::{Path, PathBuf};

/// Model specifier of the density map; it is always the first model opened.
pub const MAP_MODEL: &str = "#1";
/// Model specifier of the atomic structure, opened after the map.
pub const STRUCTURE_MODEL: &str = "#2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeQuality {
    Highest,
    Higher,
}

impl fmt::Display for EncodeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Highest => "highest",
            Self::Higher => "higher",
        })
    }
}

/// How the atomic structure is colored once it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelColoring {
    /// Color cartoons only (`target c`).
    Cartoon(&'static str),
    Flat(&'static str),
}

/// A single line of ChimeraX command script.
///
/// The `Display` implementation produces the exact text the engine expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(PathBuf),
    WindowSize { width: u32, height: u32 },
    CalcLevel,
    VolumeLevel(f64),
    VolumeColor(&'static str),
    VolumeTransparency(f32),
    ColorRadial(&'static [&'static str]),
    BackgroundColor(String),
    View,
    ColorModel(ModelColoring),
    HideAtoms,
    ShowCartoons,
    Silhouettes { width: u32 },
    Lighting(&'static str),
    Zoom(f32),
    Turn {
        axis: Axis,
        degrees: f32,
        frames: Option<u32>,
    },
    MovieRecord {
        supersample: u32,
        width: u32,
        height: u32,
    },
    Wait(u32),
    MovieEncode {
        output: PathBuf,
        framerate: u32,
        quality: EncodeQuality,
    },
    Stop,
    SaveImage {
        path: PathBuf,
        supersample: u32,
        transparent_background: bool,
    },
    SaveSession(PathBuf),
    Exit,
}

fn quoted(path: &Path) -> String {
    shell_quote(&path.to_string_lossy()).into_owned()
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(path) => write!(f, "open {}", quoted(path)),
            Self::WindowSize { width, height } => write!(f, "windowsize {} {}", width, height),
            Self::CalcLevel => write!(f, "volume calc_level {}", MAP_MODEL),
            Self::VolumeLevel(level) => write!(f, "volume {} level {}", MAP_MODEL, level),
            Self::VolumeColor(color) => write!(f, "volume {} color {}", MAP_MODEL, color),
            Self::VolumeTransparency(t) => write!(f, "volume {} transparency {}", MAP_MODEL, t),
            Self::ColorRadial(palette) => write!(
                f,
                "color radial {} center {} palette {}",
                MAP_MODEL,
                MAP_MODEL,
                palette.join(":")
            ),
            Self::BackgroundColor(color) => write!(f, "set bgColor {}", color),
            Self::View => write!(f, "view {}", MAP_MODEL),
            Self::ColorModel(ModelColoring::Cartoon(color)) => {
                write!(f, "color {} {} target c", STRUCTURE_MODEL, color)
            }
            Self::ColorModel(ModelColoring::Flat(color)) => {
                write!(f, "color {} {}", STRUCTURE_MODEL, color)
            }
            Self::HideAtoms => write!(f, "hide {} atoms", STRUCTURE_MODEL),
            Self::ShowCartoons => write!(f, "show {} cartoons", STRUCTURE_MODEL),
            Self::Silhouettes { width } => write!(f, "graphics silhouettes true width {}", width),
            Self::Lighting(mode) => write!(f, "lighting {}", mode),
            Self::Zoom(factor) => write!(f, "zoom {}", factor),
            Self::Turn {
                axis,
                degrees,
                frames: None,
            } => write!(f, "turn {} {}", axis, degrees),
            Self::Turn {
                axis,
                degrees,
                frames: Some(frames),
            } => write!(f, "turn {} {} {}", axis, degrees, frames),
            Self::MovieRecord {
                supersample,
                width,
                height,
            } => write!(
                f,
                "movie record supersample {} size {},{} transparentBackground true format png",
                supersample, width, height
            ),
            Self::Wait(frames) => write!(f, "wait {}", frames),
            Self::MovieEncode {
                output,
                framerate,
                quality,
            } => write!(
                f,
                "movie encode output {} framerate {} quality {}",
                quoted(output),
                framerate,
                quality
            ),
            Self::Stop => f.write_str("stop"),
            Self::SaveImage {
                path,
                supersample,
                transparent_background,
            } => write!(
                f,
                "save {} format png supersample {} transparentBackground {}",
                quoted(path),
                supersample,
                if *transparent_background { "True" } else { "False" }
            ),
            Self::SaveSession(path) => write!(f, "save {}", quoted(path)),
            Self::Exit => f.write_str("exit"),
        }
    }
}

/// An ordered command sequence. Each command relies on the engine state left
/// by the ones before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandScript {
    commands: Vec<Command>,
}

impl CommandScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.extend(commands);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.commands.iter().map(ToString::to_string).collect()
    }

    /// The script as file content: one command per line, no trailing newline.
    pub fn to_text(&self) -> String {
        self.lines().join("\n")
    }
}

impl From<Vec<Command>> for CommandScript {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_arguments_use_shortest_representation() {
        assert_eq!(Command::VolumeTransparency(0.1).to_string(), "volume #1 transparency 0.1");
        assert_eq!(Command::VolumeTransparency(0.0).to_string(), "volume #1 transparency 0");
        assert_eq!(Command::VolumeLevel(0.3).to_string(), "volume #1 level 0.3");
        assert_eq!(
            Command::VolumeLevel(0.123456789).to_string(),
            "volume #1 level 0.123456789"
        );
        assert_eq!(Command::Zoom(0.8).to_string(), "zoom 0.8");
    }

    #[test]
    fn turn_renders_with_and_without_frame_count() {
        let tilt = Command::Turn {
            axis: Axis::X,
            degrees: -90.0,
            frames: None,
        };
        let spin = Command::Turn {
            axis: Axis::Y,
            degrees: 0.5,
            frames: Some(720),
        };
        assert_eq!(tilt.to_string(), "turn x -90");
        assert_eq!(spin.to_string(), "turn y 0.5 720");
    }

    #[test]
    fn paths_are_shell_quoted() {
        let open = Command::Open(PathBuf::from("/data/my map.mrc"));
        assert_eq!(open.to_string(), "open '/data/my map.mrc'");

        let save = Command::SaveImage {
            path: PathBuf::from("/out/a.png"),
            supersample: 4,
            transparent_background: false,
        };
        assert_eq!(
            save.to_string(),
            "save /out/a.png format png supersample 4 transparentBackground False"
        );
    }

    #[test]
    fn model_coloring_variants() {
        assert_eq!(
            Command::ColorModel(ModelColoring::Cartoon("royalblue")).to_string(),
            "color #2 royalblue target c"
        );
        assert_eq!(
            Command::ColorModel(ModelColoring::Flat("grey")).to_string(),
            "color #2 grey"
        );
    }

    #[test]
    fn script_text_has_no_trailing_newline() {
        let script = CommandScript::from(vec![Command::CalcLevel, Command::Stop, Command::Exit]);
        assert_eq!(script.to_text(), "volume calc_level #1\nstop\nexit");
        assert_eq!(script.len(), 3);
    }
}

use crate::core::contour::ContourLevel;
use crate::core::script::schemes::{ColorScheme, QualityPreset, SchemeError};
use serde::{Deserialize, Deserializer};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Path for '{field}' must be absolute, got '{path}'", path = path.display())]
    RelativePath { field: &'static str, path: PathBuf },
    #[error("Render mode '{mode}' is not enabled by output format '{format}'")]
    ModeNotSelected {
        mode: RenderMode,
        format: OutputFormat,
    },
    #[error("Unknown render mode '{0}'. Expected 'image' or 'movie'")]
    UnknownMode(String),
    #[error("Unknown output format '{0}'. Expected 'image', 'movie' or 'both'")]
    UnknownOutputFormat(String),
    #[error(
        "Invalid background color '{0}'. Expected white, black, #FFFFFF, #181818, #2A2A2A, #161f28 or a #RRGGBB hex code"
    )]
    InvalidBackground(String),
    #[error(transparent)]
    Scheme(#[from] SchemeError),
}

macro_rules! deserialize_via_from_str {
    ($ty:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer)?
                    .parse()
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

/// One of the two script pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Image,
    Movie,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Movie => "movie",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "image" => Ok(Self::Image),
            "movie" => Ok(Self::Movie),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Which artifacts a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Image,
    Movie,
    Both,
}

impl OutputFormat {
    /// The selected modes in the order they are rendered: movie first, then image.
    pub fn modes(self) -> &'static [RenderMode] {
        match self {
            Self::Image => &[RenderMode::Image],
            Self::Movie => &[RenderMode::Movie],
            Self::Both => &[RenderMode::Movie, RenderMode::Image],
        }
    }

    pub fn includes(self, mode: RenderMode) -> bool {
        self.modes().contains(&mode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Movie => "movie",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "image" => Ok(Self::Image),
            "movie" => Ok(Self::Movie),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::UnknownOutputFormat(s.to_string())),
        }
    }
}

const NAMED_BACKGROUNDS: [&str; 6] = ["white", "black", "#FFFFFF", "#181818", "#2A2A2A", "#161f28"];

pub const DEFAULT_BACKGROUND: &str = "#161f28";

/// A background color accepted by `set bgColor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackgroundColor(String);

impl BackgroundColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self(DEFAULT_BACKGROUND.to_string())
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BackgroundColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let is_hex = s.len() == 7
            && s.starts_with('#')
            && s[1..].chars().all(|c| c.is_ascii_hexdigit());
        if NAMED_BACKGROUNDS.contains(&s) || is_hex {
            Ok(Self(s.to_string()))
        } else {
            Err(ConfigError::InvalidBackground(s.to_string()))
        }
    }
}

deserialize_via_from_str!(RenderMode);
deserialize_via_from_str!(OutputFormat);
deserialize_via_from_str!(BackgroundColor);

/// The files a single mode writes besides its script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOutputs {
    pub artifact: PathBuf,
    pub session: PathBuf,
}

/// Fully resolved rendering settings. All paths are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub map_path: PathBuf,
    pub model_path: Option<PathBuf>,
    pub contour: ContourLevel,
    pub color_scheme: ColorScheme,
    pub background: Option<BackgroundColor>,
    pub quality: QualityPreset,
    pub format: OutputFormat,
    pub transparent_background: bool,
    pub save_session: bool,
    pub exit_after_run: bool,
    /// Output prefix: `<dir>/<name>` without extension.
    pub output_base: PathBuf,
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl RenderConfig {
    pub fn outputs(&self, mode: RenderMode) -> ModeOutputs {
        match mode {
            RenderMode::Movie => ModeOutputs {
                artifact: with_suffix(&self.output_base, "_chimerax_movie.mov"),
                session: with_suffix(&self.output_base, "_chimerax_movie_session.cxs"),
            },
            RenderMode::Image => ModeOutputs {
                artifact: with_suffix(&self.output_base, "_chimerax_image.png"),
                session: with_suffix(&self.output_base, "_chimerax_image_session.cxs"),
            },
        }
    }

    pub fn command_log_path(&self) -> PathBuf {
        with_suffix(&self.output_base, "_command.txt")
    }
}

#[derive(Default)]
pub struct RenderConfigBuilder {
    map_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    contour: Option<ContourLevel>,
    color_scheme: Option<ColorScheme>,
    background: Option<BackgroundColor>,
    quality: Option<QualityPreset>,
    format: Option<OutputFormat>,
    transparent_background: Option<bool>,
    save_session: Option<bool>,
    exit_after_run: Option<bool>,
    output_base: Option<PathBuf>,
}

impl RenderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_path(mut self, path: PathBuf) -> Self {
        self.map_path = Some(path);
        self
    }
    pub fn model_path(mut self, path: Option<PathBuf>) -> Self {
        self.model_path = path;
        self
    }
    pub fn contour(mut self, level: ContourLevel) -> Self {
        self.contour = Some(level);
        self
    }
    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = Some(scheme);
        self
    }
    pub fn background(mut self, color: Option<BackgroundColor>) -> Self {
        self.background = color;
        self
    }
    pub fn quality(mut self, quality: QualityPreset) -> Self {
        self.quality = Some(quality);
        self
    }
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }
    pub fn transparent_background(mut self, enabled: bool) -> Self {
        self.transparent_background = Some(enabled);
        self
    }
    pub fn save_session(mut self, enabled: bool) -> Self {
        self.save_session = Some(enabled);
        self
    }
    pub fn exit_after_run(mut self, enabled: bool) -> Self {
        self.exit_after_run = Some(enabled);
        self
    }
    pub fn output_base(mut self, base: PathBuf) -> Self {
        self.output_base = Some(base);
        self
    }

    pub fn build(self) -> Result<RenderConfig, ConfigError> {
        let map_path = self
            .map_path
            .ok_or(ConfigError::MissingParameter("map_path"))?;
        let output_base = self
            .output_base
            .ok_or(ConfigError::MissingParameter("output_base"))?;

        require_absolute("map_path", &map_path)?;
        require_absolute("output_base", &output_base)?;
        if let Some(model) = &self.model_path {
            require_absolute("model_path", model)?;
        }

        Ok(RenderConfig {
            map_path,
            model_path: self.model_path,
            contour: self
                .contour
                .ok_or(ConfigError::MissingParameter("contour"))?,
            color_scheme: self.color_scheme.unwrap_or_default(),
            background: self.background,
            quality: self.quality.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
            transparent_background: self.transparent_background.unwrap_or(false),
            save_session: self.save_session.unwrap_or(false),
            exit_after_run: self.exit_after_run.unwrap_or(true),
            output_base,
        })
    }
}

pub(crate) fn require_absolute(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativePath {
            field,
            path: path.to_path_buf(),
        })
    }
}

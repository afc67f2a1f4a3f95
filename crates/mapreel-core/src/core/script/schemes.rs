//! Lookup tables for map color schemes and movie quality presets.
//!
//! Each tag resolves to fixed, hand-tuned data; adding a scheme or preset is a
//! table entry, and every enum variant is guaranteed an entry by `match`
//! exhaustiveness.

use super::command::{Command, EncodeQuality, ModelColoring};
use phf::{Map, phf_map};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAP_TRANSPARENCY: f32 = 0.1;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SchemeError {
    #[error("Unknown color scheme '{0}'. Expected one of: kelly, blue, emdb, rainbow, rainbowr")]
    UnknownColorScheme(String),
    #[error("Unknown quality preset '{0}'. Expected one of: publication, onscreen, web")]
    UnknownQuality(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    Kelly,
    #[default]
    Blue,
    Emdb,
    Rainbow,
    RainbowReversed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapFill {
    Solid(&'static str),
    Radial(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemeTemplate {
    pub fill: MapFill,
    pub transparency: f32,
    pub model: ModelColoring,
}

impl SchemeTemplate {
    /// The commands that color the map surface.
    pub fn map_commands(&self) -> [Command; 2] {
        let fill = match self.fill {
            MapFill::Solid(color) => Command::VolumeColor(color),
            MapFill::Radial(palette) => Command::ColorRadial(palette),
        };
        [fill, Command::VolumeTransparency(self.transparency)]
    }
}

const GREY_MODEL: ModelColoring = ModelColoring::Flat("grey");

static KELLY: SchemeTemplate = SchemeTemplate {
    fill: MapFill::Solid("cornflowerblue"),
    transparency: MAP_TRANSPARENCY,
    model: ModelColoring::Cartoon("royalblue"),
};

static BLUE: SchemeTemplate = SchemeTemplate {
    fill: MapFill::Radial(&["#045a8d", "#2b8cbe", "#74a9cf", "#bdc9e1", "#f1eef6"]),
    transparency: MAP_TRANSPARENCY,
    model: GREY_MODEL,
};

static EMDB: SchemeTemplate = SchemeTemplate {
    fill: MapFill::Radial(&["#AD2447", "#EA3861", "#38B249", "#90CB8A", "#CFE7CB"]),
    transparency: MAP_TRANSPARENCY,
    model: GREY_MODEL,
};

static RAINBOW: SchemeTemplate = SchemeTemplate {
    fill: MapFill::Radial(&[
        "#DC504D", "#E37F4F", "#EDEB7E", "#71B86D", "#5BB6E7", "#4263AA",
    ]),
    transparency: MAP_TRANSPARENCY,
    model: GREY_MODEL,
};

static RAINBOW_REVERSED: SchemeTemplate = SchemeTemplate {
    fill: MapFill::Radial(&[
        "#4263AA", "#5BB6E7", "#71B86D", "#EDEB7E", "#E37F4F", "#DC504D",
    ]),
    transparency: MAP_TRANSPARENCY,
    model: GREY_MODEL,
};

static SCHEME_NAMES: Map<&'static str, ColorScheme> = phf_map! {
    "kelly" => ColorScheme::Kelly,
    "blue" => ColorScheme::Blue,
    "emdb" => ColorScheme::Emdb,
    "rainbow" => ColorScheme::Rainbow,
    "rainbowr" => ColorScheme::RainbowReversed,
    "rainbow-reversed" => ColorScheme::RainbowReversed,
};

impl ColorScheme {
    pub fn template(self) -> &'static SchemeTemplate {
        match self {
            Self::Kelly => &KELLY,
            Self::Blue => &BLUE,
            Self::Emdb => &EMDB,
            Self::Rainbow => &RAINBOW,
            Self::RainbowReversed => &RAINBOW_REVERSED,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kelly => "kelly",
            Self::Blue => "blue",
            Self::Emdb => "emdb",
            Self::Rainbow => "rainbow",
            Self::RainbowReversed => "rainbowr",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SCHEME_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| SchemeError::UnknownColorScheme(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for ColorScheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Movie capture settings bundled under a quality name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingPreset {
    pub supersample: u32,
    pub width: u32,
    pub height: u32,
    pub encode_quality: EncodeQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    Publication,
    #[default]
    Onscreen,
    Web,
}

static PUBLICATION: RecordingPreset = RecordingPreset {
    supersample: 4,
    width: 1400,
    height: 1400,
    encode_quality: EncodeQuality::Highest,
};

static ONSCREEN: RecordingPreset = RecordingPreset {
    supersample: 3,
    width: 750,
    height: 750,
    encode_quality: EncodeQuality::Highest,
};

static WEB: RecordingPreset = RecordingPreset {
    supersample: 2,
    width: 750,
    height: 750,
    encode_quality: EncodeQuality::Higher,
};

impl QualityPreset {
    pub fn recording(self) -> &'static RecordingPreset {
        match self {
            Self::Publication => &PUBLICATION,
            Self::Onscreen => &ONSCREEN,
            Self::Web => &WEB,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publication => "publication",
            Self::Onscreen => "onscreen",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityPreset {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "publication" => Ok(Self::Publication),
            "onscreen" => Ok(Self::Onscreen),
            "web" => Ok(Self::Web),
            _ => Err(SchemeError::UnknownQuality(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for QualityPreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

use super::config::{ConfigError, RenderConfig, RenderMode, require_absolute};
use super::error::EngineError;
use crate::core::contour::ContourLevel;
use crate::core::script::command::{Axis, Command, CommandScript};
use std::path::Path;
use tracing::debug;

const WINDOW_SIZE: u32 = 750;
const SILHOUETTE_WIDTH: u32 = 2;
const LIGHTING_MODE: &str = "soft";
const ZOOM_FACTOR: f32 = 0.8;
const MOVIE_TILT_DEGREES: f32 = 90.0;
const MOVIE_ROLL_DEGREES: f32 = -30.0;
const SPIN_DEGREES_PER_FRAME: f32 = 0.5;
const SPIN_FRAMES: u32 = 720;
const MOVIE_FRAMERATE: u32 = 30;
const IMAGE_TILT_DEGREES: f32 = -90.0;
const IMAGE_SUPERSAMPLE: u32 = 4;

/// Assembles the ChimeraX command sequence for one render mode.
///
/// The builder performs no I/O. The same configuration always yields the same
/// script.
pub struct ScriptBuilder<'a> {
    config: &'a RenderConfig,
}

impl<'a> ScriptBuilder<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::RelativePath`] if any path in the configuration is
    /// not absolute, and [`ConfigError::ModeNotSelected`] if `mode` is not part
    /// of the configured output format.
    pub fn build(&self, mode: RenderMode) -> Result<CommandScript, EngineError> {
        if !self.config.format.includes(mode) {
            return Err(ConfigError::ModeNotSelected {
                mode,
                format: self.config.format,
            }
            .into());
        }
        self.validate_paths()?;

        let mut script = CommandScript::new();
        self.open_and_normalize(&mut script);
        self.apply_contour(&mut script);
        self.apply_coloring(&mut script);
        self.apply_background(&mut script);
        self.overlay_model(&mut script);
        self.setup_camera(&mut script);

        let outputs = self.config.outputs(mode);
        match mode {
            RenderMode::Movie => self.record_movie(&mut script, &outputs.artifact),
            RenderMode::Image => self.save_image(&mut script, &outputs.artifact),
        }

        if self.config.save_session {
            script.push(Command::SaveSession(outputs.session));
        }
        if self.config.exit_after_run {
            script.push(Command::Exit);
        }

        debug!("Built {} script with {} commands", mode, script.len());
        Ok(script)
    }

    fn validate_paths(&self) -> Result<(), ConfigError> {
        require_absolute("map_path", &self.config.map_path)?;
        require_absolute("output_base", &self.config.output_base)?;
        if let Some(model) = &self.config.model_path {
            require_absolute("model_path", model)?;
        }
        Ok(())
    }

    fn open_and_normalize(&self, script: &mut CommandScript) {
        script.extend([
            Command::Open(self.config.map_path.clone()),
            Command::WindowSize {
                width: WINDOW_SIZE,
                height: WINDOW_SIZE,
            },
            Command::CalcLevel,
        ]);
    }

    fn apply_contour(&self, script: &mut CommandScript) {
        script.push(match self.config.contour {
            ContourLevel::Deferred => Command::CalcLevel,
            ContourLevel::Explicit(level) => Command::VolumeLevel(level),
        });
    }

    fn apply_coloring(&self, script: &mut CommandScript) {
        script.extend(self.config.color_scheme.template().map_commands());
    }

    fn apply_background(&self, script: &mut CommandScript) {
        if let Some(color) = &self.config.background {
            script.push(Command::BackgroundColor(color.to_string()));
        }
    }

    fn overlay_model(&self, script: &mut CommandScript) {
        match &self.config.model_path {
            Some(model) => script.extend([
                Command::Open(model.clone()),
                Command::View,
                Command::ColorModel(self.config.color_scheme.template().model),
                Command::HideAtoms,
                Command::ShowCartoons,
            ]),
            // The scheme's transparency assumes a structure drawn inside the map.
            None => script.push(Command::VolumeTransparency(0.0)),
        }
    }

    fn setup_camera(&self, script: &mut CommandScript) {
        script.extend([
            Command::Silhouettes {
                width: SILHOUETTE_WIDTH,
            },
            Command::Lighting(LIGHTING_MODE),
            Command::View,
            Command::Zoom(ZOOM_FACTOR),
        ]);
    }

    fn record_movie(&self, script: &mut CommandScript, movie_path: &Path) {
        let preset = self.config.quality.recording();
        script.extend([
            Command::Turn {
                axis: Axis::X,
                degrees: MOVIE_TILT_DEGREES,
                frames: None,
            },
            Command::Turn {
                axis: Axis::Z,
                degrees: MOVIE_ROLL_DEGREES,
                frames: None,
            },
            Command::Turn {
                axis: Axis::Y,
                degrees: SPIN_DEGREES_PER_FRAME,
                frames: Some(SPIN_FRAMES),
            },
            Command::MovieRecord {
                supersample: preset.supersample,
                width: preset.width,
                height: preset.height,
            },
            // One recorded frame per spin step.
            Command::Wait(SPIN_FRAMES),
            Command::MovieEncode {
                output: movie_path.to_path_buf(),
                framerate: MOVIE_FRAMERATE,
                quality: preset.encode_quality,
            },
            Command::Stop,
        ]);
    }

    fn save_image(&self, script: &mut CommandScript, image_path: &Path) {
        script.extend([
            Command::Turn {
                axis: Axis::X,
                degrees: IMAGE_TILT_DEGREES,
                frames: None,
            },
            Command::SaveImage {
                path: image_path.to_path_buf(),
                supersample: IMAGE_SUPERSAMPLE,
                transparent_background: self.config.transparent_background,
            },
        ]);
    }
}

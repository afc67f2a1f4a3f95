use mapreel::core::contour::ContourMethod;
use mapreel::core::script::schemes::{ColorScheme, QualityPreset};
use mapreel::engine::config::{BackgroundColor, OutputFormat};

pub struct DefaultsConfig {
    pub contour_method: ContourMethod,
    pub format: OutputFormat,
    pub quality: QualityPreset,
    pub colour: ColorScheme,
    pub background: BackgroundColor,
    pub transparent: bool,
    pub save_session: bool,
    pub exit_after_run: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            contour_method: ContourMethod::SixSigma,
            format: OutputFormat::Image,
            quality: QualityPreset::Onscreen,
            colour: ColorScheme::Blue,
            background: BackgroundColor::default(),
            transparent: false,
            save_session: false,
            exit_after_run: true,
        }
    }
}

use clap::{Args, Parser, Subcommand};
use mapreel::core::contour::ContourMethod;
use mapreel::core::script::schemes::{ColorScheme, QualityPreset};
use mapreel::engine::config::{BackgroundColor, OutputFormat};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The mapreel developers",
    version,
    about = "mapreel - Generate ChimeraX images and turntable movies of cryo-EM density maps, with optional atomic models.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write ChimeraX scripts for a density map and render them into an image and/or movie.
    Render(RenderArgs),
    /// Print voxel statistics and the contour level each estimation method would choose.
    Contour(ContourArgs),
}

/// Arguments for the `render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    // --- Map & Contour ---
    /// Path to the density map (MRC/CCP4, optionally .gz).
    #[arg(long, required = true, value_name = "PATH")]
    pub mrc: PathBuf,

    /// Path to an atomic model to overlay on the map (optionally .gz).
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Automatic contour method: 3sig, 6sig, 9sig, p99, rmsd, hybrid, abs30 or MIT
    /// (let ChimeraX decide). [default: 6sig]
    #[arg(long = "auto-contour", value_name = "METHOD")]
    pub auto_contour: Option<ContourMethod>,

    /// Explicit contour level; takes precedence over --auto-contour.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub contour: Option<f64>,

    // --- Rendering ---
    /// Produce a movie, an image or both. [default: image]
    #[arg(long, value_name = "image|movie|both")]
    pub format: Option<OutputFormat>,

    /// Movie quality preset: publication, onscreen or web. [default: onscreen]
    #[arg(long, value_name = "PRESET")]
    pub quality: Option<QualityPreset>,

    /// Color scheme for map and model: kelly, blue, emdb, rainbow or rainbowr. [default: blue]
    #[arg(long = "colour", visible_alias = "color", value_name = "SCHEME")]
    pub colour: Option<ColorScheme>,

    /// Background color: white, black, #FFFFFF, #181818, #2A2A2A, #161f28 or any #RRGGBB.
    /// [default: #161f28]
    #[arg(long, value_name = "COLOR")]
    pub background: Option<BackgroundColor>,

    /// Use a transparent background for image output.
    #[arg(long)]
    pub transparent: bool,

    // --- Output ---
    /// Base name for output files. Defaults to the map's file stem.
    #[arg(long, value_name = "NAME")]
    pub outname: Option<String>,

    /// Output directory. Defaults to the map's directory.
    #[arg(long, value_name = "DIR")]
    pub outdir: Option<PathBuf>,

    /// Save a ChimeraX session next to each output.
    #[arg(long)]
    pub save_session: bool,

    /// Only write the scripts; do not run ChimeraX.
    #[arg(long)]
    pub script_only: bool,

    /// Leave ChimeraX open after the script finishes.
    #[arg(long)]
    pub no_exit: bool,

    // --- Execution Control ---
    /// Skip the check that ChimeraX is installed.
    #[arg(long)]
    pub ignore_check: bool,

    /// Path to the ChimeraX executable, overriding MAPREEL_CHIMERAX and PATH lookup.
    #[arg(long, value_name = "PATH")]
    pub chimerax: Option<PathBuf>,

    // --- Configuration ---
    /// Path to a TOML file with default rendering settings.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S render.quality=web
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `contour` subcommand.
#[derive(Args, Debug)]
pub struct ContourArgs {
    /// Path to the density map (MRC/CCP4, optionally .gz).
    #[arg(long, required = true, value_name = "PATH")]
    pub mrc: PathBuf,

    /// Report only this method instead of all of them.
    #[arg(long, value_name = "METHOD")]
    pub method: Option<ContourMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_arguments_parse_with_color_alias() {
        let cli = Cli::parse_from([
            "mapreel",
            "render",
            "--mrc",
            "emd_1234.map.gz",
            "--color",
            "rainbowr",
            "--auto-contour",
            "MIT",
            "--format",
            "both",
            "--script-only",
        ]);
        let Commands::Render(args) = cli.command else {
            panic!("Expected 'render' subcommand");
        };
        assert_eq!(args.colour, Some(ColorScheme::RainbowReversed));
        assert_eq!(args.auto_contour, Some(ContourMethod::EngineNative));
        assert_eq!(args.format, Some(OutputFormat::Both));
        assert!(args.script_only);
        assert!(args.quality.is_none());
    }

    #[test]
    fn invalid_enumerated_values_are_rejected() {
        assert!(Cli::try_parse_from(["mapreel", "render", "--mrc", "a.map", "--colour", "pink"]).is_err());
        assert!(
            Cli::try_parse_from(["mapreel", "render", "--mrc", "a.map", "--auto-contour", "median"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["mapreel", "render", "--mrc", "a.map", "--background", "teal"])
                .is_err()
        );
    }

    #[test]
    fn map_is_required() {
        assert!(Cli::try_parse_from(["mapreel", "render"]).is_err());
    }

    #[test]
    fn global_flags_apply_to_subcommands() {
        let cli = Cli::parse_from(["mapreel", "contour", "--mrc", "a.map", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Contour(_)));
    }
}

use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, EngineSelection};
use crate::cli::RenderArgs;
use crate::error::{CliError, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub fn build_config(args: &RenderArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let contour_file = file_config.contour.take().unwrap_or_default();
    let render_file = file_config.render.take().unwrap_or_default();
    let output_file = file_config.output.take().unwrap_or_default();

    // A method on the command line beats a level from the file.
    let explicit_contour = match (args.contour, args.auto_contour) {
        (Some(level), _) => Some(level),
        (None, Some(_)) => None,
        (None, None) => contour_file.level,
    };
    let contour_method = args
        .auto_contour
        .or(contour_file.method)
        .unwrap_or(defaults.contour_method);

    let outname = args.outname.clone().or(output_file.outname);
    if let Some(name) = &outname {
        validate_outname(name)?;
    }

    let engine = if args.script_only {
        EngineSelection::ScriptOnly
    } else if args.ignore_check {
        EngineSelection::Unchecked {
            executable: args.chimerax.clone(),
        }
    } else {
        EngineSelection::Checked {
            executable: args.chimerax.clone(),
        }
    };

    Ok(AppConfig {
        map_input: args.mrc.clone(),
        model_input: args.model.clone(),
        explicit_contour,
        contour_method,
        format: args
            .format
            .or(render_file.format)
            .unwrap_or(defaults.format),
        quality: args
            .quality
            .or(render_file.quality)
            .unwrap_or(defaults.quality),
        colour: args
            .colour
            .or(render_file.colour)
            .unwrap_or(defaults.colour),
        background: args
            .background
            .clone()
            .or(render_file.background)
            .unwrap_or(defaults.background),
        transparent: args.transparent || render_file.transparent.unwrap_or(defaults.transparent),
        save_session: args.save_session
            || output_file.save_session.unwrap_or(defaults.save_session),
        exit_after_run: if args.no_exit {
            false
        } else {
            output_file.exit.unwrap_or(defaults.exit_after_run)
        },
        outdir: args.outdir.clone().or(output_file.outdir),
        outname,
        engine,
    })
}

fn validate_outname(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CliError::Argument("Output name must not be empty.".to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(CliError::Argument(format!(
            "Output name '{}' must not contain path separators; use --outdir instead.",
            name
        )));
    }
    Ok(())
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "contour.method" => {
                config.contour.get_or_insert_with(Default::default).method =
                    Some(parse_value(key, value_str)?);
            }
            "contour.level" => {
                config.contour.get_or_insert_with(Default::default).level =
                    Some(parse_value(key, value_str)?);
            }
            "render.format" => {
                config.render.get_or_insert_with(Default::default).format =
                    Some(parse_value(key, value_str)?);
            }
            "render.quality" => {
                config.render.get_or_insert_with(Default::default).quality =
                    Some(parse_value(key, value_str)?);
            }
            "render.colour" | "render.color" => {
                config.render.get_or_insert_with(Default::default).colour =
                    Some(parse_value(key, value_str)?);
            }
            "render.background" => {
                config.render.get_or_insert_with(Default::default).background =
                    Some(parse_value(key, value_str)?);
            }
            "output.outdir" => {
                config.output.get_or_insert_with(Default::default).outdir =
                    Some(PathBuf::from(value_str.trim()));
            }
            "output.outname" => {
                config.output.get_or_insert_with(Default::default).outname =
                    Some(value_str.trim().to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use mapreel::core::contour::ContourMethod;
    use mapreel::core::script::schemes::{ColorScheme, QualityPreset};
    use mapreel::engine::config::OutputFormat;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn render_args(extra: &[&str]) -> RenderArgs {
        let mut argv = vec!["mapreel", "render", "--mrc", "emd_1234.map"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Render(args) => args,
            _ => panic!("Expected 'render' subcommand"),
        }
    }

    fn config_arg(path: &Path) -> String {
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = build_config(&render_args(&[])).unwrap();

        assert_eq!(config.map_input, PathBuf::from("emd_1234.map"));
        assert_eq!(config.explicit_contour, None);
        assert_eq!(config.contour_method, ContourMethod::SixSigma);
        assert_eq!(config.format, OutputFormat::Image);
        assert_eq!(config.quality, QualityPreset::Onscreen);
        assert_eq!(config.colour, ColorScheme::Blue);
        assert_eq!(config.background.as_str(), "#161f28");
        assert!(!config.transparent);
        assert!(!config.save_session);
        assert!(config.exit_after_run);
        assert_eq!(config.outdir, None);
        assert_eq!(config.outname, None);
        assert_eq!(config.engine, EngineSelection::Checked { executable: None });
    }

    #[test]
    fn file_values_override_defaults() {
        let path = write_config_file(
            "file_over_defaults.toml",
            r#"
            [contour]
            level = 0.42
            [render]
            format = "both"
            colour = "rainbow"
            background = "white"
            [output]
            save-session = true
            exit = false
            outname = "figure"
            "#,
        );
        let config = build_config(&render_args(&["-c", &config_arg(&path)])).unwrap();

        assert_eq!(config.explicit_contour, Some(0.42));
        assert_eq!(config.format, OutputFormat::Both);
        assert_eq!(config.colour, ColorScheme::Rainbow);
        assert_eq!(config.background.as_str(), "white");
        assert!(config.save_session);
        assert!(!config.exit_after_run);
        assert_eq!(config.outname.as_deref(), Some("figure"));
        assert_eq!(config.quality, QualityPreset::Onscreen);
    }

    #[test]
    fn cli_args_override_file_values() {
        let path = write_config_file(
            "cli_over_file.toml",
            r#"
            [contour]
            method = "p99"
            [render]
            quality = "web"
            colour = "emdb"
            "#,
        );
        let config = build_config(&render_args(&[
            "-c",
            &config_arg(&path),
            "--auto-contour",
            "rmsd",
            "--quality",
            "publication",
            "--color",
            "kelly",
        ]))
        .unwrap();

        assert_eq!(config.contour_method, ContourMethod::Rmsd);
        assert_eq!(config.quality, QualityPreset::Publication);
        assert_eq!(config.colour, ColorScheme::Kelly);
    }

    #[test]
    fn cli_method_discards_level_from_file() {
        let path = write_config_file("level_in_file.toml", "[contour]\nlevel = 0.9\n");
        let config = build_config(&render_args(&[
            "-c",
            &config_arg(&path),
            "--auto-contour",
            "hybrid",
        ]))
        .unwrap();

        assert_eq!(config.explicit_contour, None);
        assert_eq!(config.contour_method, ContourMethod::Hybrid);
    }

    #[test]
    fn explicit_contour_beats_method() {
        let config =
            build_config(&render_args(&["--contour", "1.5", "--auto-contour", "9sig"])).unwrap();
        assert_eq!(config.explicit_contour, Some(1.5));
    }

    #[test]
    fn explicit_contour_is_not_rounded() {
        let config = build_config(&render_args(&["--contour", "0.123456789"])).unwrap();
        assert_eq!(config.explicit_contour, Some(0.123456789));
    }

    #[test]
    fn set_value_overrides_file_and_defaults() {
        let path = write_config_file(
            "set_over_file.toml",
            "[render]\nformat = \"movie\"\nquality = \"web\"\n",
        );
        let config = build_config(&render_args(&[
            "-c",
            &config_arg(&path),
            "-S",
            "render.format=both",
            "-S",
            "output.outdir=renders",
            "-S",
            "render.background=#123abc",
        ]))
        .unwrap();

        assert_eq!(config.format, OutputFormat::Both);
        assert_eq!(config.quality, QualityPreset::Web);
        assert_eq!(config.outdir, Some(PathBuf::from("renders")));
        assert_eq!(config.background.as_str(), "#123abc");
    }

    #[test]
    fn cli_flag_overrides_set_value() {
        let config = build_config(&render_args(&[
            "-S",
            "render.colour=emdb",
            "--colour",
            "kelly",
        ]))
        .unwrap();
        assert_eq!(config.colour, ColorScheme::Kelly);
    }

    #[test]
    fn malformed_set_values_are_config_errors() {
        for bad in ["render.format", "render.spin=360", "render.quality=4k", "contour.level=high"] {
            let result = build_config(&render_args(&["-S", bad]));
            assert!(
                matches!(result, Err(CliError::Config(_))),
                "expected config error for '{}'",
                bad
            );
        }
    }

    #[test]
    fn output_name_with_separator_is_rejected() {
        let result = build_config(&render_args(&["--outname", "renders/emd"]));
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn engine_selection_follows_flags() {
        let config = build_config(&render_args(&["--script-only", "--ignore-check"])).unwrap();
        assert_eq!(config.engine, EngineSelection::ScriptOnly);

        let config =
            build_config(&render_args(&["--ignore-check", "--chimerax", "/opt/cx/bin/chimerax"]))
                .unwrap();
        assert_eq!(
            config.engine,
            EngineSelection::Unchecked {
                executable: Some(PathBuf::from("/opt/cx/bin/chimerax"))
            }
        );
    }

    #[test]
    fn boolean_flags_and_no_exit() {
        let path = write_config_file("exit_true.toml", "[output]\nexit = true\n");
        let config = build_config(&render_args(&[
            "-c",
            &config_arg(&path),
            "--no-exit",
            "--transparent",
            "--save-session",
        ]))
        .unwrap();

        assert!(!config.exit_after_run);
        assert!(config.transparent);
        assert!(config.save_session);
    }
}

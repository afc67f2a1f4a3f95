use crate::cli::RenderArgs;
use crate::config::models::EngineSelection;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::command_log;
use crate::utils::inputs::PreparedInput;
use crate::utils::progress::CliProgressHandler;
use mapreel::engine::config::{RenderConfig, RenderConfigBuilder};
use mapreel::engine::error::EngineError;
use mapreel::engine::progress::ProgressReporter;
use mapreel::engine::runner::{ChimeraX, DEFAULT_EXECUTABLE, ENGINE_ENV_VAR};
use mapreel::workflows::{self, render::ModeOutcome};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn run(args: RenderArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;
    debug!("Resolved render configuration: {:?}", config);

    let invocation: Vec<String> = env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let progress_handler = CliProgressHandler::new();

    let outcomes = match execute(&config, &invocation, &progress_handler) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            progress_handler.abandon();
            return Err(e);
        }
    };

    report_outcomes(&outcomes);
    Ok(())
}

/// Locates ChimeraX according to the selection. Runs before any file is touched.
fn resolve_engine(selection: &EngineSelection) -> Result<Option<ChimeraX>> {
    match selection {
        EngineSelection::ScriptOnly => Ok(None),
        EngineSelection::Checked { executable: None } => Ok(Some(ChimeraX::discover()?)),
        EngineSelection::Checked {
            executable: Some(path),
        } => Ok(Some(ChimeraX::locate(
            Some(path.as_os_str()),
            env::var_os("PATH").as_deref(),
        )?)),
        EngineSelection::Unchecked { executable } => {
            let executable = executable
                .clone()
                .or_else(|| env::var_os(ENGINE_ENV_VAR).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTABLE));
            warn!(
                "Skipping ChimeraX check; will run '{}' as given.",
                executable.display()
            );
            Ok(Some(ChimeraX::new(executable)))
        }
    }
}

fn resolve_output_base(config: &AppConfig, map_path: &Path) -> Result<PathBuf> {
    let outdir = match &config.outdir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            std::path::absolute(dir)?
        }
        None => map_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CliError::Argument(format!("'{}' has no parent directory", map_path.display())))?,
    };

    let name = match &config.outname {
        Some(name) => name.clone(),
        None => map_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CliError::Argument(format!("Cannot derive an output name from '{}'", map_path.display()))
            })?,
    };

    Ok(outdir.join(name))
}

fn execute(
    config: &AppConfig,
    invocation: &[String],
    progress_handler: &CliProgressHandler,
) -> Result<Vec<ModeOutcome>> {
    let engine = resolve_engine(&config.engine)?;
    if let Some(engine) = &engine {
        info!("Using ChimeraX at {}", engine.executable().display());
    }

    // Decompressed copies live until these guards drop at the end of the run.
    let map = PreparedInput::prepare(&config.map_input)?;
    let model = config
        .model_input
        .as_deref()
        .map(PreparedInput::prepare)
        .transpose()?;
    if map.is_temporary() || model.as_ref().is_some_and(PreparedInput::is_temporary) {
        debug!("Working from decompressed copies of compressed inputs.");
    }

    let output_base = resolve_output_base(config, map.path())?;
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let contour = workflows::render::resolve_contour(
        map.path(),
        config.explicit_contour,
        config.contour_method,
        &reporter,
    )?;

    let render_config: RenderConfig = RenderConfigBuilder::new()
        .map_path(map.path().to_path_buf())
        .model_path(model.as_ref().map(|m| m.path().to_path_buf()))
        .contour(contour)
        .color_scheme(config.colour)
        .background(Some(config.background.clone()))
        .quality(config.quality)
        .format(config.format)
        .transparent_background(config.transparent)
        .save_session(config.save_session)
        .exit_after_run(config.exit_after_run)
        .output_base(output_base)
        .build()
        .map_err(EngineError::from)?;

    command_log::record_invocation(&render_config.command_log_path(), invocation);

    println!("Generating ChimeraX {} output...", config.format);
    info!("Invoking the core render workflow...");
    let outcomes = workflows::render::run(&render_config, engine.as_ref(), &reporter)?;
    info!("Workflow finished with {} mode(s).", outcomes.len());

    drop(model);
    drop(map);
    Ok(outcomes)
}

fn report_outcomes(outcomes: &[ModeOutcome]) {
    for outcome in outcomes {
        match outcome.exit_status {
            None => println!(
                "✓ {} script written to: {}",
                outcome.mode,
                outcome.script_path.display()
            ),
            Some(status) if status.success() => {
                if outcome.artifact_path.exists() {
                    println!(
                        "✓ {} written to: {}",
                        outcome.mode,
                        outcome.artifact_path.display()
                    );
                } else {
                    println!(
                        "Warning: ChimeraX finished but {} was not created.",
                        outcome.artifact_path.display()
                    );
                }
                if let Some(session) = &outcome.session_path {
                    println!("  Session: {}", session.display());
                }
            }
            Some(status) => println!(
                "Warning: ChimeraX exited with {} while rendering the {}. Script kept at: {}",
                status,
                outcome.mode,
                outcome.script_path.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use mapreel::core::contour::ContourMethod;
    use mapreel::core::script::schemes::{ColorScheme, QualityPreset};
    use mapreel::engine::config::{BackgroundColor, OutputFormat, RenderMode};
    use std::fs::{self, File};
    use std::io::Write;

    // A 2x2x1 float32 map with mean 0.1 and population stddev 0.05.
    fn tiny_map() -> Vec<u8> {
        let mut bytes = vec![0u8; 1024];
        for (index, value) in [2i32, 2, 1, 2].into_iter().enumerate() {
            bytes[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes[208..212].copy_from_slice(b"MAP ");
        bytes[212] = 0x44;
        bytes[213] = 0x44;
        for value in [0.05f32, 0.15, 0.05, 0.15] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    fn app_config(map_input: PathBuf) -> AppConfig {
        AppConfig {
            map_input,
            model_input: None,
            explicit_contour: None,
            contour_method: ContourMethod::Rmsd,
            format: OutputFormat::Both,
            quality: QualityPreset::Web,
            colour: ColorScheme::Blue,
            background: BackgroundColor::default(),
            transparent: false,
            save_session: false,
            exit_after_run: true,
            outdir: None,
            outname: None,
            engine: EngineSelection::ScriptOnly,
        }
    }

    fn invocation() -> Vec<String> {
        ["mapreel", "render", "--mrc", "emd_1234.map"]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn script_only_run_writes_scripts_and_command_log() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("emd_1234.map");
        fs::write(&map, tiny_map()).unwrap();

        let outcomes =
            execute(&app_config(map.clone()), &invocation(), &CliProgressHandler::hidden()).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].mode, RenderMode::Movie);
        let image_script = dir.path().join("emd_1234_chimerax_image_script.cxc");
        assert!(dir.path().join("emd_1234_chimerax_movie_script.cxc").exists());
        assert_eq!(outcomes[1].script_path, image_script);

        let script = fs::read_to_string(image_script).unwrap();
        assert!(script.contains("volume #1 level 0.25"));

        let log = fs::read_to_string(dir.path().join("emd_1234_command.txt")).unwrap();
        assert!(log.ends_with("mapreel render --mrc emd_1234.map\n"));
    }

    #[test]
    fn gzip_map_is_removed_after_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("emd_1234.map.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(&tiny_map()).unwrap();
        encoder.finish().unwrap();

        let mut config = app_config(gz.clone());
        config.format = OutputFormat::Image;
        let outcomes = execute(&config, &invocation(), &CliProgressHandler::hidden()).unwrap();

        let script = fs::read_to_string(&outcomes[0].script_path).unwrap();
        let expanded = dir.path().join("emd_1234.map");
        assert!(script.starts_with(&format!("open {}", expanded.display())));
        assert!(!expanded.exists());
        assert!(gz.exists());
    }

    #[test]
    fn outdir_and_outname_shape_the_output_base() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("emd_1234.map");
        fs::write(&map, tiny_map()).unwrap();

        let mut config = app_config(map);
        config.format = OutputFormat::Image;
        config.explicit_contour = Some(0.7);
        config.outdir = Some(dir.path().join("renders"));
        config.outname = Some("figure1".to_string());

        let outcomes = execute(&config, &invocation(), &CliProgressHandler::hidden()).unwrap();
        assert_eq!(
            outcomes[0].artifact_path,
            dir.path().join("renders").join("figure1_chimerax_image.png")
        );
        assert!(dir.path().join("renders/figure1_command.txt").exists());
    }

    #[test]
    fn missing_engine_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("emd_1234.map");
        fs::write(&map, tiny_map()).unwrap();

        let mut config = app_config(map);
        config.engine = EngineSelection::Checked {
            executable: Some(dir.path().join("bin/chimerax")),
        };

        let result = execute(&config, &invocation(), &CliProgressHandler::hidden());
        assert!(matches!(
            result,
            Err(CliError::MapreelCore(EngineError::EngineUnavailable { .. }))
        ));
        assert!(!dir.path().join("emd_1234_command.txt").exists());
        assert!(!dir.path().join("emd_1234_chimerax_image_script.cxc").exists());
    }

    #[test]
    fn failed_contour_still_cleans_up_decompressed_map() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("broken.mrc.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"not an mrc file").unwrap();
        encoder.finish().unwrap();

        let result = execute(&app_config(gz), &invocation(), &CliProgressHandler::hidden());
        assert!(matches!(
            result,
            Err(CliError::MapreelCore(EngineError::MapLoad { .. }))
        ));
        assert!(!dir.path().join("broken.mrc").exists());
    }

    #[cfg(unix)]
    #[test]
    fn unchecked_engine_is_run_for_each_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("emd_1234.map");
        fs::write(&map, tiny_map()).unwrap();
        let calls = dir.path().join("calls.log");
        let fake = dir.path().join("fake-chimerax");
        fs::write(
            &fake,
            format!("#!/bin/sh\necho \"$1 $2\" >> '{}'\n", calls.display()),
        )
        .unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = app_config(map);
        config.engine = EngineSelection::Unchecked {
            executable: Some(fake),
        };

        let outcomes = execute(&config, &invocation(), &CliProgressHandler::hidden()).unwrap();
        assert!(outcomes.iter().all(|o| o.exit_status.is_some()));
        let calls = fs::read_to_string(calls).unwrap();
        assert_eq!(calls.lines().count(), 2);
        assert!(calls.lines().all(|l| l.starts_with("--script ")));
    }
}

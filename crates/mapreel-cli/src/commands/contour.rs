use crate::cli::ContourArgs;
use crate::error::{CliError, Result};
use mapreel::core::contour::{self, ContourMethod, ContourReport};
use mapreel::core::io::mrc::MrcFile;
use mapreel::core::io::traits::VolumeFile;
use mapreel::engine::error::EngineError;
use tracing::{debug, info};

pub fn run(args: ContourArgs) -> Result<()> {
    info!("Loading density map from {:?}", &args.mrc);
    let (samples, header) =
        MrcFile::read_from_path(&args.mrc).map_err(|e| CliError::FileParsing {
            path: args.mrc.clone(),
            source: e.into(),
        })?;
    debug!("MRC header: {:?}", header);

    let [nx, ny, nz] = samples.dimensions();
    println!("Map: {}", args.mrc.display());
    println!("  Grid:    {} x {} x {} ({} voxels, {:?})", nx, ny, nz, samples.len(), header.mode);

    if let Some(method) = args.method {
        let level = contour::estimate(method, Some(&samples)).map_err(EngineError::from)?;
        println!("  {:<8} {}", method.as_str(), level);
        return Ok(());
    }

    let report = ContourReport::from_samples(&samples).map_err(EngineError::from)?;
    println!("  Mean:    {:.6}", report.mean);
    println!("  Std:     {:.6}", report.stddev);
    println!("  Range:   {:.6} .. {:.6}", report.min, report.max);
    println!();
    println!("  {:<8} Level", "Method");
    for (method, level) in &report.levels {
        println!("  {:<8} {}", method.as_str(), level);
    }
    println!(
        "  {:<8} engine-native (ChimeraX chooses)",
        ContourMethod::EngineNative.as_str()
    );

    Ok(())
}

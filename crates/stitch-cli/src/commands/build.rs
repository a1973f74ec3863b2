//! `stitch build`.

use std::path::Path;

use crate::cli::BuildArgs;
use crate::config::StitchConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use stitch_bundler::Pipeline;

/// Execute the build command.
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Check the source root exists
/// 3. Run the pipeline, which commits the output tree atomically
/// 4. Print a summary
///
/// Any module failure fails the whole build and leaves the output root
/// untouched; the error names the module.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let config = StitchConfig::load(&args, &cwd)?;
    config.validate()?;

    check_src_dir(&config.src_dir)?;

    if !config.languages.is_empty() {
        ui::warning(&format!(
            "No localizer is configured; languages {} are ignored",
            config.languages.join(", ")
        ));
    }

    ui::info(&format!(
        "Building {} entry point{} from {}",
        config.entry_points.len(),
        if config.entry_points.len() == 1 { "" } else { "s" },
        config.src_dir.display()
    ));

    let report = Pipeline::new(config.to_pipeline_options()).run().await?;

    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(report.elapsed)
    ));
    ui::print_build_summary(&report);
    Ok(())
}

/// The source root must be an existing directory.
fn check_src_dir(src_dir: &Path) -> Result<()> {
    let metadata = std::fs::metadata(src_dir)
        .with_path(src_dir)
        .with_hint("Set srcDir in stitch.config.json or pass --src-dir")?;
    if !metadata.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Source root '{}' is not a directory",
            src_dir.display()
        )));
    }
    Ok(())
}

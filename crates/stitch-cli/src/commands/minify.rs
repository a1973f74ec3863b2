//! `stitch minify`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::MinifyArgs;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use stitch_bundler::minify::{MinifyOptions, minify_tree};

/// Execute the minify command.
///
/// Nothing is written when any file fails, including a script whose
/// minified form contains a non-Latin-1 character.
pub async fn execute(args: MinifyArgs) -> Result<()> {
    let started = Instant::now();

    let metadata = std::fs::metadata(&args.dir).with_path(&args.dir)?;
    if !metadata.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "'{}' is not a directory",
            args.dir.display()
        )));
    }
    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => default_out_dir(&args.dir)?,
    };
    if out_dir == args.dir {
        return Err(CliError::InvalidArgument(
            "--out-dir must differ from the input directory".to_string(),
        ));
    }

    let mut options = MinifyOptions {
        source_maps: !args.no_source_maps,
        ..MinifyOptions::default()
    };
    if let Some(limit) = args.max_parallel {
        options.max_parallel = limit;
    }

    ui::info(&format!(
        "Minifying {} into {}",
        args.dir.display(),
        out_dir.display()
    ));
    let report = minify_tree(&args.dir, &out_dir, &options).await?;

    ui::success("Minification complete");
    ui::print_minify_summary(&report, started.elapsed());
    Ok(())
}

/// `<dir>-min` next to `dir`.
fn default_out_dir(dir: &Path) -> Result<PathBuf> {
    let name = dir.file_name().ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "Cannot derive an output directory from '{}'; pass --out-dir",
            dir.display()
        ))
    })?;
    Ok(dir.with_file_name(format!("{}-min", name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_out_dir() {
        assert_eq!(default_out_dir(Path::new("out")).unwrap(), PathBuf::from("out-min"));
        assert_eq!(
            default_out_dir(Path::new("build/out")).unwrap(),
            PathBuf::from("build/out-min")
        );
        assert!(default_out_dir(Path::new("..")).is_err());
    }
}

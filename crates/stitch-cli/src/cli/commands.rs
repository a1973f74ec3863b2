use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::{parse_language, parse_parallelism};

/// Available Stitch subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble an output tree
    ///
    /// Bundles every module named by the configured entry points, builds the
    /// loader preamble, copies resources, runs concatenation jobs and writes
    /// the merged, source-mapped result atomically.
    Build(BuildArgs),

    /// Minify an assembled output tree
    ///
    /// Minifies scripts, stylesheets and SVG images. Fails if a minified
    /// script contains a character outside Latin-1.
    Minify(MinifyArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Path to the configuration file
    ///
    /// Defaults to stitch.config.json in the working directory, if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Module to bundle, in addition to configured entry points
    ///
    /// Examples:
    ///   stitch build --entry vs/workbench/workbench.main
    #[arg(short, long = "entry", value_name = "MODULE")]
    pub entries: Vec<String>,

    /// Source root that module names resolve against
    #[arg(long, value_name = "DIR")]
    pub src_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Bundle one module at a time
    #[arg(long, conflicts_with = "max_parallel")]
    pub serial: bool,

    /// Cap on concurrently bundled modules
    #[arg(long, value_name = "N", value_parser = parse_parallelism)]
    pub max_parallel: Option<usize>,

    /// Do not emit bundleInfo.json
    #[arg(long)]
    pub no_bundle_info: bool,

    /// Target language for localization (repeatable)
    #[arg(short, long = "language", value_name = "TAG", value_parser = parse_language)]
    pub languages: Vec<String>,
}

/// Arguments for the minify command
#[derive(Args, Debug)]
pub struct MinifyArgs {
    /// Assembled output tree to minify
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Destination for the minified tree
    ///
    /// Defaults to `<DIR>-min` next to the input.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Cap on files minified at once
    #[arg(long, value_name = "N", value_parser = parse_parallelism)]
    pub max_parallel: Option<usize>,

    /// Do not write external source maps for scripts
    #[arg(long)]
    pub no_source_maps: bool,
}

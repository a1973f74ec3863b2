//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `stitch build` - assemble an output tree from entry points
//! - `stitch minify` - minify and validate an assembled tree

mod commands;
mod tests;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command, MinifyArgs};
pub use validation::{parse_language, parse_parallelism};

/// Stitch - parallel module bundling and deterministic output assembly
#[derive(Parser, Debug)]
#[command(
    name = "stitch",
    version,
    about = "Parallel module bundling and deterministic output assembly",
    long_about = "Stitch bundles every module of a build independently and in parallel,\n\
                  then merges bundles, resources, a loader preamble and bundle metadata\n\
                  into one source-mapped output tree whose order never depends on timing."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

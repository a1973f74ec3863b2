#![cfg_attr(docsrs, feature(doc_cfg))]

//! # stitch-bundler
//!
//! Output assembly for a source-to-distributable build: bundles every module
//! of a build independently and in parallel, then stitches the results,
//! passthrough resources, a hand-built loader preamble and bundle metadata
//! into one deterministic, source-mapped output tree.
//!
//! ## Quick Start
//!
//! ```no_run
//! use stitch_bundler::{EntryPoint, Pipeline, PipelineOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = PipelineOptions::new("src", "out")
//!     .entry_point(EntryPoint::new("vs/workbench/workbench.main"))
//!     .resources(["vs/**/*.png", "vs/**/*.css"]);
//!
//! let report = Pipeline::new(options).run().await?;
//! println!("wrote {} files", report.files);
//! # Ok(()) }
//! ```
//!
//! ## Minify an assembled tree
//!
//! ```no_run
//! use stitch_bundler::minify::{MinifyOptions, minify_tree};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = minify_tree(Path::new("out"), Path::new("out-min"), &MinifyOptions::default()).await?;
//! println!("{} scripts minified", report.scripts);
//! # Ok(()) }
//! ```

pub mod builders;
pub mod diagnostics;
pub mod engine;
pub mod localize;
pub mod minify;
pub mod modules;
pub mod output;
pub mod pipeline;
pub mod sourcemap;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use builders::concat::ConcatJob;
pub use builders::executor::{BundleSetOutput, ExecutorOptions, execute_bundles};
pub use builders::header::HeaderInjector;
pub use builders::invoker::{ModuleBundle, invoke_module};
pub use builders::preamble::{ExternalLoaderInfo, LoaderPreamble};
pub use engine::{AssetLoader, BundleConfig, BundleEngine, BundleRequest, EngineOutput, Metafile};
pub use engine::rolldown::RolldownEngine;
pub use localize::{LocalizeOptions, LocalizedStreams, Localizer, Passthrough};
pub use modules::{CSS_SHIM_MODULE, EntryPoint, ModuleSet, resolve_module_set};
pub use output::metadata::BundleMetadata;
pub use output::{OutputFile, merge::MergeInputs, merge::merge_streams};
pub use pipeline::{BuildReport, Pipeline, PipelineOptions};
pub use sourcemap::{RawSourceMap, SourceMapOptions};

use std::path::PathBuf;

/// Error types for stitch-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bundling engine rejected one module.
    #[error("Bundling '{module}' failed: {}", format_bundler_error(.diagnostics))]
    ModuleBundle {
        module: String,
        diagnostics: Vec<diagnostics::ExtractedDiagnostic>,
    },

    /// No source file exists for a module name.
    #[error("Entry file for module '{module}' not found (searched: {})", format_paths(.searched))]
    EntryNotFound {
        module: String,
        searched: Vec<PathBuf>,
    },

    /// A bundling task panicked.
    #[error("Bundling task for '{module}' panicked: {message}")]
    TaskPanicked { module: String, message: String },

    /// Minified script output contains a character outside Latin-1.
    #[error(
        "Found non-Latin-1 character '{character}' (U+{code_point:04X}) in the minified output of {file}"
    )]
    NonLatin1Output {
        file: String,
        character: char,
        code_point: u32,
    },

    /// Minifier failed on one file.
    #[error("Failed to minify {file}: {message}")]
    Minify { file: String, message: String },

    /// Source map could not be read or rewritten.
    #[error("Source map error in {file}: {message}")]
    SourceMap { file: String, message: String },

    /// Localization pass failed.
    #[error("Localization failed: {0}")]
    Localization(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for stitch-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a module bundling error from a Rolldown error.
    ///
    /// Extracts structured diagnostics from Rolldown's error types.
    pub fn from_rolldown_batch(module: &str, error: &dyn std::fmt::Debug) -> Self {
        Error::ModuleBundle {
            module: module.to_string(),
            diagnostics: diagnostics::extract_from_rolldown_error(error),
        }
    }

    /// Attach a path to an I/O error.
    pub fn io_at(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::IoError {
            message: format!("{}: {}", path.display(), source),
            source,
        }
    }

    /// Name of the module or file that triggered this error, when known.
    pub fn trigger(&self) -> Option<&str> {
        match self {
            Error::ModuleBundle { module, .. }
            | Error::EntryNotFound { module, .. }
            | Error::TaskPanicked { module, .. } => Some(module),
            Error::NonLatin1Output { file, .. }
            | Error::Minify { file, .. }
            | Error::SourceMap { file, .. } => Some(file),
            _ => None,
        }
    }
}

/// Format bundler error diagnostics for display.
fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    if diagnostics.is_empty() {
        return "Unknown bundler error".to_string();
    }

    if diagnostics.len() == 1 {
        let diag = &diagnostics[0];
        format!("{}: {}", diag.kind, diag.message)
    } else {
        format!(
            "{} errors: {}",
            diagnostics.len(),
            diagnostics
                .iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        )
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::ModuleBundle { .. } => "MODULE_BUNDLE_FAILED",
            Error::EntryNotFound { .. } => "ENTRY_NOT_FOUND",
            Error::TaskPanicked { .. } => "TASK_PANICKED",
            Error::NonLatin1Output { .. } => "NON_LATIN1_OUTPUT",
            Error::Minify { .. } => "MINIFY_FAILED",
            Error::SourceMap { .. } => "SOURCE_MAP",
            Error::Localization(_) => "LOCALIZATION",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Io(_) | Error::IoError { .. } => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::ModuleBundle { diagnostics, .. } => {
                if diagnostics.len() == 1 {
                    diagnostics[0]
                        .help
                        .as_ref()
                        .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>)
                } else {
                    Some(Box::new(
                        "Multiple bundler errors occurred. See details above.".to_string(),
                    ))
                }
            }
            Error::EntryNotFound { module, .. } => Some(Box::new(format!(
                "Module '{}' is listed in an entry point but has no .ts, .js or .mjs source under the source root.",
                module
            ))),
            Error::NonLatin1Output { .. } => Some(Box::new(
                "Non-Latin-1 characters in minified scripts slow down loading. \
                 Replace the literal character (often inside a regular expression) with a \\u escape sequence."
                    .to_string(),
            )),
            Error::TaskPanicked { .. } => Some(Box::new(
                "This is a bug in stitch or the bundling engine. Please report it.".to_string(),
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays inside the output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            _ => None,
        }
    }
}

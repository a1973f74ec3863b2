//! Stitch CLI - parallel module bundling and deterministic output assembly.
//!
//! Exposes the functionality of `stitch-bundler` through two commands:
//!
//! - `stitch build` assembles an output tree from entry-point declarations
//! - `stitch minify` minifies and validates an assembled tree
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - `stitch.config.json` loading via figment
//! - [`commands`] - command implementations
//! - [`error`] - CLI error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status lines and formatting

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};

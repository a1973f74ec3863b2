//! Command implementations.
//!
//! - [`build`] - assemble an output tree
//! - [`minify`] - minify an assembled tree
//!
//! Each command exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod minify;

pub use build::execute as build_execute;
pub use minify::execute as minify_execute;

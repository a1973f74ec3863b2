//! Producers of the output sub-streams.
//!
//! - [`invoker`] / [`executor`]: per-module bundling, run in parallel
//! - [`preamble`]: the hand-assembled loader file
//! - [`concat`]: manual concatenation jobs
//! - [`resources`]: passthrough files
//! - [`header`]: copyright header injection shared by the above

pub mod concat;
pub mod dedupe;
pub mod executor;
pub mod header;
pub mod invoker;
pub mod preamble;
pub mod resources;

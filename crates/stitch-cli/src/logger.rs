//! Logging setup for the Stitch CLI.
//!
//! The library emits `tracing` events; this installs the subscriber.
//!
//! Level selection, first match wins:
//! 1. `--verbose`: debug for the stitch crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for the stitch crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "stitch=debug,stitch_bundler=debug,stitch_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "stitch=info,stitch_bundler=info,stitch_cli=info";

/// Install the global subscriber. Later calls are ignored.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

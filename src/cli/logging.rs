//! Diagnostic logging to stderr

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

/// Environment variable holding a full `tracing` filter directive
pub const LOG_ENV: &str = "CHEMPROV_LOG";

/// Default filter for the verbosity flags
pub fn default_directive(global: &GlobalOpts) -> &'static str {
    if global.verbose {
        "chemprov=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the global subscriber; `CHEMPROV_LOG` overrides the flags
pub fn init(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));

    // A subscriber may already be installed when embedded; keep that one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

//! Tracing setup for the CLI.
//!
//! Log lines go to stderr so command output on stdout stays clean. `RUST_LOG`
//! takes precedence over `--verbose` when set:
//!
//! ```text
//! spacetraveling serve                           # info
//! spacetraveling --verbose serve                 # debug
//! RUST_LOG=spacetraveling=trace spacetraveling serve
//! ```

use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
}

//! Diagnostic logging.
//!
//! Logs go to stderr so stdout stays parseable for scripts. The filter comes
//! from `AUDIODECK_LOG` (`EnvFilter` syntax) or, failing that, from the
//! number of `-v` flags.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "AUDIODECK_LOG";

/// Default filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "audiodeck=warn",
        1 => "audiodeck=info",
        2 => "audiodeck=debug",
        _ => "audiodeck=trace",
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbosity: u8, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .try_init();
}

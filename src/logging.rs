//! Logging and tracing configuration for audiosum
//!
//! Diagnostics use the `tracing` crate and always go to stderr, since stdout
//! carries the result lines.
//!
//! # Log Levels
//!
//! - `warn`  - default
//! - `info`  - batch summaries (`-v`)
//! - `debug` - per-file boundaries and digests (`-vv`)
//! - `trace` - every probe window (`-vvv`)
//!
//! # Environment Variable Control
//!
//! `RUST_LOG` takes precedence over `-v`:
//! ```bash
//! RUST_LOG=audiosum=debug audiosum < files.txt
//! RUST_LOG=audiosum::tags=trace audiosum < files.txt
//! ```

use tracing_subscriber::{fmt, EnvFilter, prelude::*};

/// Default filter for a `-v` count
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "audiosum=warn",
        1 => "audiosum=info",
        2 => "audiosum=debug",
        _ => "audiosum=trace",
    }
}

/// Initialize the logging/tracing system
///
/// Call this once at application startup (in main.rs)
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)      // Show module path
                .with_thread_ids(verbosity > 2)
                .with_file(false)
                .with_line_number(false)
                .compact()
        );

    // Set as global default (ignore error if already set)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

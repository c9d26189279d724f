//! Diagnostic logging setup
//!
//! Logs go to stderr so reports on stdout stay machine-readable.
//! `RUST_LOG` overrides the level derived from `-v`/`-q`.

use crate::config::Verbosity;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter for `verbosity`, preferring `RUST_LOG` when set
#[must_use]
pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity.is_verbose()),
        )
        .try_init();
}

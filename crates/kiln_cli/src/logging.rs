//! Tracing subscriber setup.

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The filter used when `RUST_LOG` is not set.
pub fn default_directive(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs a compact stderr subscriber. `RUST_LOG` overrides the flags.
pub fn init(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));
    let layer = fmt::layer()
        .compact()
        .with_target(verbose)
        .without_time()
        .with_writer(io::stderr);
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_from_flags() {
        assert_eq!(default_directive(false, false), "warn");
        assert_eq!(default_directive(false, true), "debug");
        assert_eq!(default_directive(true, true), "error");
    }
}

//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; the build summary printed by
//! [`crate::output`] stays on stdout so it can be piped. The level defaults
//! to `warn` (`debug` with `--verbose`) and `RUST_LOG` overrides both.
//! `LOG_FORMAT=json` switches to one JSON object per line for CI log
//! collectors.

use std::env;
use std::io;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Default filter directive for the crate.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "gf_press=debug,warn" } else { "warn" }
}

/// Install the global subscriber. Calling it twice is harmless: the second
/// call leaves the first subscriber in place.
pub fn init(verbose: bool) {
    let filter = env::var("RUST_LOG")
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
        .add_directive(
            "sqlx=warn"
                .parse()
                .unwrap_or_else(|_| tracing::Level::WARN.into()),
        );

    let registry = tracing_subscriber::registry().with(filter);
    let result = match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .without_time()
                    .with_writer(io::stderr),
            )
            .try_init(),
    };
    // Already initialized (tests, embedding): keep the existing subscriber
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_crate_level() {
        assert_eq!(default_directive(false), "warn");
        assert!(default_directive(true).contains("gf_press=debug"));
    }

    #[test]
    fn directives_parse() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_directive(verbose)).is_ok());
        }
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}

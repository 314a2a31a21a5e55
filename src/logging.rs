//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr so transcript output on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Filter directives, in `EnvFilter` syntax.
pub const LOG_ENV_VAR: &str = "SCENE_COMPOSER_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Installs the global fmt subscriber.
///
/// Returns false when a global subscriber is already installed.
pub fn init_from_env() -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

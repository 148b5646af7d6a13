//! Logging setup for binaries and bindings embedding the engine.
//!
//! The library itself only emits `tracing` events; nothing is printed
//! unless the host installs a subscriber, for example with
//! [`init_tracing`].

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "U_REPORT_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "u_report=info";

static INIT: Once = Once::new();

/// Installs a formatted subscriber filtered by `U_REPORT_LOG`,
/// e.g. `U_REPORT_LOG=u_report::pipeline=debug`.
///
/// Safe to call more than once. Leaves an already installed global
/// subscriber in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(filter)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set");
        }
    });
}

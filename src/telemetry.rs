use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "TRIPLEDGER_LOG";

/// Initialize tracing with the TRIPLEDGER_LOG environment variable.
///
/// Defaults to "info" level if TRIPLEDGER_LOG is not set. Logs go to stderr so
/// tables written to stdout stay machine-readable.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Logging setup for hosts embedding the trainer

use tracing_subscriber::prelude::*;

/// Install a global fmt subscriber
///
/// Default level is INFO; RUST_LOG overrides it. Returns false when a
/// global subscriber was already installed, in which case that one stays.
pub fn init_tracing() -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Global subscriber already installed");
            false
        }
    }
}

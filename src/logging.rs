//! Logging setup. The library only emits `tracing` events; binaries and
//! tests decide where they go.

use tracing::subscriber::NoSubscriber;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered at `level` (`"info"`, `"debug"`,
/// or any `EnvFilter` directive). `RUST_LOG` wins when set. Calling it
/// again is harmless.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Runs `f` with every event on this thread discarded.
pub fn without_logs<T>(f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(NoSubscriber::default(), f)
}

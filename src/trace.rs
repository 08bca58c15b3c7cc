//! Logging facade.
//!
//! Enable with `--features tracing`. Without the feature every macro expands to nothing, so the
//! hot paths carry no logging cost.

/// Install a `tracing` subscriber that writes to stdout. The filter is taken from `RUST_LOG` and
/// defaults to `waitq=trace`.
///
/// Does nothing if the `tracing` feature is not enabled. Safe to call more than once.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waitq=trace"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_names(true).with_timer(fmt::time::uptime()))
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as warn;

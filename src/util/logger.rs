//! Logging setup
//!
//! Thin wrapper over `tracing-subscriber`. The filter is taken from
//! `RUST_LOG` when set, otherwise defaults to `info`.
//!
//! # Usage
//!
//! ```rust
//! use abacus::util::logger;
//!
//! logger::init();
//! tracing::info!("hello");
//! ```

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

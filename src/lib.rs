//! Control-surface driver for ProPresenter.
//!
//! Turns user intents into remote-control socket commands or REST link
//! requests, tracks what the remote reports, and completes discovery
//! intents once the remote answers.

pub mod addressing;
#[cfg(feature = "api")]
pub mod api;
pub mod broadcast;
pub mod clock;
pub mod correlation;
pub mod error;
pub mod paths;
pub mod registry;
pub mod settings;
pub mod state;
pub mod tokens;
pub mod transport;
pub mod variables;
pub mod wire;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,propresenter_control=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

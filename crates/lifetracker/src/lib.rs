//! Public SDK surface for LifeTracker.
//!
//! This crate re-exports the building blocks, wires them into a [`Service`]
//! and hosts the service over MCP.

pub mod host;
pub mod service;

/// Re-export for convenience.
pub use lifetracker_config as config;
/// Re-export for convenience.
pub use lifetracker_protocol as protocol;
/// Re-export for convenience.
pub use lifetracker_store as store;
/// Re-export for convenience.
pub use lifetracker_tools as tools;

pub use host::LifeTrackerServer;
pub use service::{Backend, Service};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Logs go to stderr so they never interleave with the stdio transport.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .target(env_logger::Target::Stderr)
            .try_init();
    }
}

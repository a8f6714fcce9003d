//! Logging setup for storefront binaries.
//!
//! Filtering follows `RUST_LOG` (default `info`). Output is JSON lines unless
//! `STOREFRONT_LOG_FORMAT=pretty` asks for human-readable text.

mod subscriber;

pub use subscriber::{init_with, LogFormat, LOG_FORMAT_VAR};

/// Install the process-wide subscriber in the format named by the environment.
///
/// Only the first call installs anything.
pub fn init() {
    init_with(LogFormat::from_env());
}

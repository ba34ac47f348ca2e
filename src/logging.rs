//! Console logger setup.
//!
//! The level comes from the [`Config`] handed in by the caller, the
//! environment is never consulted.

use crate::config::Config;

pub fn builder(config: &Config) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.log_level())
        .format_timestamp_micros()
        .format_module_path(false)
        .format_target(true);
    builder
}

/// Install the console logger. A logger that is already installed is kept.
pub fn init(config: &Config) {
    if let Err(e) = builder(config).try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}

//! Logging setup driven by the RUST_LOG environment variable.

use std::env;

/// Initialize env_logger with an `info` default.
///
/// Levels can be tuned per module, e.g.
/// `RUST_LOG=crypto_proxy::execution=debug`.
pub fn init_logging() {
    if env::var("RUST_LOG").is_err() {
        unsafe {
            env::set_var("RUST_LOG", "info");
        }
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .format_module_path(true)
        .format_target(false)
        .init();
}

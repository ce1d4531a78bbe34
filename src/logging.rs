//! Logger setup for binaries and demos
//!
//! The library itself only uses the `log` macros.

/// Installs `env_logger` with `info` as the default level
///
/// `RUST_LOG` overrides the default. Calling this more than once is harmless.
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already initialized");
    }
}

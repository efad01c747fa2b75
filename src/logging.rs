// 📝 Logging setup shared by the binaries

use env_logger::Env;

/// Install the global logger.
///
/// `RUST_LOG` wins; otherwise `default_filter` applies. The terminal form
/// passes `"error"` so log lines do not scribble over the alternate screen.
/// Calling this twice is harmless.
pub fn init_logging(default_filter: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .format_module_path(false)
        .try_init();
}

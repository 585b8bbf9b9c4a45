use tracing_subscriber::{EnvFilter, fmt};

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (usually
/// [`Settings::log_filter`](crate::config::Settings::log_filter)) is used.
/// Calling this twice is harmless: the second install is ignored.
pub fn init(default_filter: &str) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(default_filter))
		.unwrap_or_else(|_| EnvFilter::new("info"));

	let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

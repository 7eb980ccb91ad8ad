//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, filtered by `RUST_LOG`
///
/// Does nothing if a global subscriber is already installed, so it is safe to
/// call from tests and from embedding applications.
pub fn init() {
	let res = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_target(false)
		.try_init();
	if res.is_err() {
		tracing::debug!("tracing subscriber already installed");
	}
}

// vim: ts=4

//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::prelude::*;

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(default_filter: &str) -> PbResult<()> {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(default_filter))
		.map_err(|err| Error::ConfigError(format!("invalid log filter: {}", err)))?;

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.try_init()
		.map_err(|err| Error::Internal(format!("logging already initialized: {}", err)))
}


// vim: ts=4

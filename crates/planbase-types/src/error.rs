//! Error type shared by every Planbase crate

use std::fmt;

pub type PbResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Entity does not exist (or is outside the caller's organization)
	NotFound,
	PermissionDenied,
	/// Persistence layer failure, details are logged where it happened
	DbError,
	ValidationError(String),
	ConfigError(String),
	NetworkError(String),
	Timeout,
	Parse,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::NetworkError(msg) => write!(f, "network error: {}", msg),
			Error::Timeout => write!(f, "timeout"),
			Error::Parse => write!(f, "parse error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("JSON error: {}", err);
		Self::Parse
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		assert_eq!(Error::NotFound.to_string(), "not found");
		assert_eq!(
			Error::ValidationError("bad role".into()).to_string(),
			"validation error: bad role"
		);
	}

	#[test]
	fn test_from_json_error() {
		let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		assert!(matches!(Error::from(err), Error::Parse));
	}
}

// vim: ts=4

//! Error type shared by the service and the storage adapters

pub type PvResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Caller error: unknown settings kind or consent type, malformed id, oversized field
	ValidationError(String),
	/// Backing store unreachable, busy or timed out. May be retried.
	DbError,
	/// A storage guarantee was broken (e.g. a uniqueness conflict surfaced
	/// from get-or-create). Never a normal "not found".
	InvariantViolation(String),
	ConfigError(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Whether retrying the same operation may succeed
	pub fn is_transient(&self) -> bool {
		matches!(self, Error::DbError)
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
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

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_only_db_errors_are_transient() {
		assert!(Error::DbError.is_transient());
		assert!(!Error::ValidationError("x".into()).is_transient());
		assert!(!Error::InvariantViolation("x".into()).is_transient());
	}

	#[test]
	fn test_display() {
		let err = Error::ValidationError("unknown consent type: foo".into());
		assert_eq!(err.to_string(), "validation error: unknown consent type: foo");
	}
}

// vim: ts=4

//! Error type shared by handlers, middleware and the router.

use thiserror::Error;

/// Errors raised while handling a request.
///
/// Every variant maps to an HTTP status through [`Error::status_code`]; the
/// conversion into a [`Response`](crate::Response) renders the message as
/// `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum Error {
	/// The request could not be understood (malformed body, bad path parameter).
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// No route matches the request path.
	#[error("Not found: {0}")]
	NotFound(String),

	/// A route matches the path but not the method.
	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	/// A response body could not be serialized.
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// The store rejected or failed an operation.
	#[error("Database error: {0}")]
	Database(String),

	/// Anything else.
	#[error("Internal server error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Error::BadRequest(_) => 400,
			Error::NotFound(_) => 404,
			Error::MethodNotAllowed(_) => 405,
			Error::Serialization(_) | Error::Database(_) | Error::Internal(_) => 500,
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(error: serde_json::Error) -> Self {
		Error::Serialization(error.to_string())
	}
}

/// Result alias used across the HTTP layer.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
	/// The request never produced a response, or its body was unreadable.
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// The API answered with a non-success status.
	#[error("server responded with {status}: {body}")]
	Status { status: u16, body: String },
}

impl ClientError {
	/// HTTP status of a rejected request.
	pub fn status(&self) -> Option<u16> {
		match self {
			ClientError::Status { status, .. } => Some(*status),
			ClientError::Http(e) => e.status().map(|s| s.as_u16()),
		}
	}
}

pub type Result<T> = std::result::Result<T, ClientError>;

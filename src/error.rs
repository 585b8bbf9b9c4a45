use crate::config::ConfigError;
use thiserror::Error;

/// Failures while starting, running or administering the service.
#[derive(Debug, Error)]
pub enum AppError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Database(#[from] tiktak_db::DatabaseError),

	#[error(transparent)]
	Server(#[from] tiktak_server::ServerError),

	#[error("invalid route table: {0}")]
	Routing(#[from] tiktak_http::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

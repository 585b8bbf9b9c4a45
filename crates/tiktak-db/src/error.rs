//! Error types for the store.

use thiserror::Error;

/// Errors raised by the store, the migration executor and the seeder.
#[derive(Debug, Error)]
pub enum DatabaseError {
	/// No user row carries the given username.
	#[error("no user with username '{0}'")]
	UserNotFound(String),

	/// A migration could not be applied or reverted.
	#[error("Migration error: {0}")]
	Migration(String),

	/// The connection settings are unusable.
	#[error("Configuration error: {0}")]
	Config(String),

	/// Error reported by SQLx or SQLite itself.
	#[error("SQL error: {0}")]
	Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
	/// Whether the store rejected the write because of a foreign key.
	pub fn is_foreign_key_violation(&self) -> bool {
		match self {
			DatabaseError::Sqlx(sqlx::Error::Database(db)) => db.is_foreign_key_violation(),
			_ => false,
		}
	}
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

//! The locally persisted current username.

use std::io;
use std::path::{Path, PathBuf};

pub const SESSION_PATH_VAR: &str = "TIKTAK_SESSION";
pub const SESSION_FILE_NAME: &str = ".tiktak_session";

/// A file holding the username of whoever is "logged in" on this machine.
///
/// A missing or blank file means nobody is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	path: PathBuf,
}

impl Session {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `$TIKTAK_SESSION`, else `~/.tiktak_session`.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let path = match lookup(SESSION_PATH_VAR) {
			Some(path) if !path.is_empty() => PathBuf::from(path),
			_ => home::home_dir()
				.map(|home| home.join(SESSION_FILE_NAME))
				.unwrap_or_else(|| PathBuf::from(SESSION_FILE_NAME)),
		};
		Self::new(path)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The username exactly as it was saved, since the server matches
	/// usernames byte for byte.
	pub fn current_username(&self) -> io::Result<Option<String>> {
		match std::fs::read_to_string(&self.path) {
			Ok(contents) if contents.trim().is_empty() => Ok(None),
			Ok(contents) => Ok(Some(contents)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub fn save(&self, username: &str) -> io::Result<()> {
		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&self.path, username)
	}

	pub fn clear(&self) -> io::Result<()> {
		match std::fs::remove_file(&self.path) {
			Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
			_ => Ok(()),
		}
	}
}

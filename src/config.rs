//! Layered application settings.
//!
//! Values are resolved from, lowest to highest priority:
//!
//! 1. built-in defaults,
//! 2. a TOML file (`tiktak.toml`, or the path named by `TIKTAK_SETTINGS`),
//! 3. the environment variables `PORT`, `DATABASE_URL` and `TIKTAK_LOG`.
//!
//! ```toml
//! port = 8080
//! database_url = "sqlite://feed.db?mode=rwc"
//! log_filter = "tiktak=debug,info"
//!
//! [database]
//! max_connections = 10
//! ```

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tiktak_db::DatabaseConfig;

pub const DEFAULT_SETTINGS_FILE: &str = "tiktak.toml";
pub const SETTINGS_PATH_VAR: &str = "TIKTAK_SETTINGS";
pub const PORT_VAR: &str = "PORT";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_FILTER_VAR: &str = "TIKTAK_LOG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read settings file {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid settings file {}: {source}", path.display())]
	Toml {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid value {value:?} for {key}: {message}")]
	InvalidValue {
		key: String,
		value: String,
		message: String,
	},
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	pub host: IpAddr,
	pub port: u16,
	pub database_url: String,
	/// `tracing_subscriber::EnvFilter` directives.
	pub log_filter: String,
	pub min_connections: u32,
	pub max_connections: u32,
	/// How long shutdown waits for the server to stop.
	pub shutdown_timeout: Duration,
}

impl Default for Settings {
	fn default() -> Self {
		let database = DatabaseConfig::default();
		Self {
			host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
			port: 3000,
			database_url: database.url,
			log_filter: "info".to_string(),
			min_connections: database.min_connections,
			max_connections: database.max_connections,
			shutdown_timeout: Duration::from_secs(30),
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
	host: Option<IpAddr>,
	port: Option<u16>,
	database_url: Option<String>,
	log_filter: Option<String>,
	shutdown_timeout_secs: Option<u64>,
	database: FileDatabaseSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileDatabaseSettings {
	min_connections: Option<u32>,
	max_connections: Option<u32>,
}

impl Settings {
	/// Resolve settings from the process environment and the working directory.
	pub fn load() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Resolve settings reading variables through `lookup`.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();

		match lookup(SETTINGS_PATH_VAR) {
			Some(path) => settings.merge_file(Path::new(&path))?,
			None => {
				let path = Path::new(DEFAULT_SETTINGS_FILE);
				if path.exists() {
					settings.merge_file(path)?;
				}
			}
		}

		settings.merge_env(lookup)?;
		Ok(settings)
	}

	/// Overlay the values present in the TOML file at `path`.
	pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		self.merge_toml(&contents).map_err(|source| ConfigError::Toml {
			path: path.to_path_buf(),
			source,
		})
	}

	fn merge_toml(&mut self, contents: &str) -> Result<(), toml::de::Error> {
		let file: FileSettings = toml::from_str(contents)?;

		if let Some(host) = file.host {
			self.host = host;
		}
		if let Some(port) = file.port {
			self.port = port;
		}
		if let Some(url) = file.database_url {
			self.database_url = url;
		}
		if let Some(filter) = file.log_filter {
			self.log_filter = filter;
		}
		if let Some(secs) = file.shutdown_timeout_secs {
			self.shutdown_timeout = Duration::from_secs(secs);
		}
		if let Some(min) = file.database.min_connections {
			self.min_connections = min;
		}
		if let Some(max) = file.database.max_connections {
			self.max_connections = max;
		}
		Ok(())
	}

	/// Overlay the environment variables that are set.
	pub fn merge_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(port) = lookup(PORT_VAR) {
			self.port = port.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
				key: PORT_VAR.to_string(),
				value: port.clone(),
				message: e.to_string(),
			})?;
		}
		if let Some(url) = lookup(DATABASE_URL_VAR) {
			if url.trim().is_empty() {
				return Err(ConfigError::InvalidValue {
					key: DATABASE_URL_VAR.to_string(),
					value: url,
					message: "must not be empty".to_string(),
				});
			}
			self.database_url = url;
		}
		if let Some(filter) = lookup(LOG_FILTER_VAR) {
			self.log_filter = filter;
		}
		Ok(())
	}

	pub fn bind_addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}

	pub fn database_config(&self) -> DatabaseConfig {
		DatabaseConfig::new(self.database_url.clone())
			.with_pool_size(self.min_connections, self.max_connections)
	}
}

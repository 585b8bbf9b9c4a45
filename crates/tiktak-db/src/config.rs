/// Connection pool settings for the store.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	/// Database URL (e.g., "sqlite://tiktak.db?mode=rwc", "sqlite::memory:")
	pub url: String,

	/// Connection pool size (min)
	pub min_connections: u32,

	/// Connection pool size (max)
	pub max_connections: u32,

	/// Connection acquire timeout in seconds
	pub acquire_timeout: u64,

	/// Maximum idle time for a connection in seconds (None = no limit)
	pub idle_timeout: Option<u64>,

	/// Maximum lifetime for a connection in seconds (None = no limit)
	pub max_lifetime: Option<u64>,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: "sqlite://tiktak.db?mode=rwc".to_string(),
			min_connections: 1,
			max_connections: 5,
			acquire_timeout: 30,
			idle_timeout: Some(600),  // 10 minutes
			max_lifetime: Some(1800), // 30 minutes
		}
	}
}

impl DatabaseConfig {
	/// Create new config with URL
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			..Default::default()
		}
	}

	/// Private in-memory database, mostly for tests.
	pub fn in_memory() -> Self {
		Self::new("sqlite::memory:")
	}

	/// Set pool sizes
	pub fn with_pool_size(mut self, min: u32, max: u32) -> Self {
		self.min_connections = min;
		self.max_connections = max;
		self
	}

	/// Set acquire timeout in seconds
	pub fn with_acquire_timeout(mut self, timeout: u64) -> Self {
		self.acquire_timeout = timeout;
		self
	}

	/// Set idle timeout in seconds (None = no limit)
	pub fn with_idle_timeout(mut self, timeout: Option<u64>) -> Self {
		self.idle_timeout = timeout;
		self
	}

	/// Set max lifetime in seconds (None = no limit)
	pub fn with_max_lifetime(mut self, lifetime: Option<u64>) -> Self {
		self.max_lifetime = lifetime;
		self
	}

	/// Whether the URL names an in-memory database.
	///
	/// Each SQLite connection opens its own in-memory database, so the store
	/// pins these to a single connection that is never recycled.
	pub fn is_in_memory(&self) -> bool {
		self.url.contains(":memory:") || self.url.contains("mode=memory")
	}
}

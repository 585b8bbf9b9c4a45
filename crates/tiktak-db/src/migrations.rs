//! Versioned schema migrations.
//!
//! Each [`Migration`] is a list of SQL statements to apply and a list to
//! revert. Applied migrations are recorded by name in the
//! `tiktak_migrations` table; the executor runs every migration inside its
//! own transaction so a failing statement leaves no partial schema behind.

use crate::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

/// A single schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
	pub name: &'static str,
	pub up: &'static [&'static str],
	pub down: &'static [&'static str],
}

/// The schema, oldest first.
pub const MIGRATIONS: &[Migration] = &[
	Migration {
		name: "20200831195300-create-user",
		up: &["CREATE TABLE users (
			id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
			username VARCHAR(255) NOT NULL,
			createdAt DATETIME NOT NULL,
			updatedAt DATETIME NOT NULL
		)"],
		down: &["DROP TABLE users"],
	},
	Migration {
		name: "20200831195342-create-post",
		up: &[
			"CREATE TABLE posts (
			id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
			contents VARCHAR(255) NOT NULL,
			userID INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
			score INTEGER NOT NULL DEFAULT 1,
			createdAt DATETIME NOT NULL,
			updatedAt DATETIME NOT NULL
		)",
			"CREATE INDEX posts_user_id ON posts (userID)",
		],
		down: &["DROP INDEX posts_user_id", "DROP TABLE posts"],
	},
	Migration {
		name: "20200831195416-create-comment",
		up: &[
			"CREATE TABLE comments (
			id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
			contents VARCHAR(255) NOT NULL,
			postID INTEGER NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
			userID INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
			createdAt DATETIME NOT NULL,
			updatedAt DATETIME NOT NULL
		)",
			"CREATE INDEX comments_post_id ON comments (postID)",
		],
		down: &["DROP INDEX comments_post_id", "DROP TABLE comments"],
	},
];

/// Migration record
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MigrationRecord {
	pub name: String,
	pub applied: DateTime<Utc>,
}

/// Reads and writes the `tiktak_migrations` bookkeeping table.
#[derive(Debug, Default, Clone, Copy)]
pub struct MigrationRecorder;

impl MigrationRecorder {
	pub fn new() -> Self {
		Self
	}

	pub async fn ensure_schema_table<'c, E>(&self, executor: E) -> Result<()>
	where
		E: Executor<'c, Database = Sqlite>,
	{
		sqlx::query(
			"CREATE TABLE IF NOT EXISTS tiktak_migrations (
				name VARCHAR(255) PRIMARY KEY NOT NULL,
				applied DATETIME NOT NULL
			)",
		)
		.execute(executor)
		.await?;
		Ok(())
	}

	/// Applied migrations, oldest first.
	pub async fn applied_migrations<'c, E>(&self, executor: E) -> Result<Vec<MigrationRecord>>
	where
		E: Executor<'c, Database = Sqlite>,
	{
		let records = sqlx::query_as::<_, MigrationRecord>(
			"SELECT name, applied FROM tiktak_migrations ORDER BY applied, name",
		)
		.fetch_all(executor)
		.await?;
		Ok(records)
	}

	pub async fn is_applied<'c, E>(&self, executor: E, name: &str) -> Result<bool>
	where
		E: Executor<'c, Database = Sqlite>,
	{
		let found: Option<String> =
			sqlx::query_scalar("SELECT name FROM tiktak_migrations WHERE name = ?")
				.bind(name)
				.fetch_optional(executor)
				.await?;
		Ok(found.is_some())
	}

	pub async fn record_applied<'c, E>(&self, executor: E, name: &str) -> Result<()>
	where
		E: Executor<'c, Database = Sqlite>,
	{
		sqlx::query("INSERT INTO tiktak_migrations (name, applied) VALUES (?, ?)")
			.bind(name)
			.bind(Utc::now())
			.execute(executor)
			.await?;
		Ok(())
	}

	/// Remove a migration record (for rollback)
	pub async fn unapply<'c, E>(&self, executor: E, name: &str) -> Result<()>
	where
		E: Executor<'c, Database = Sqlite>,
	{
		sqlx::query("DELETE FROM tiktak_migrations WHERE name = ?")
			.bind(name)
			.execute(executor)
			.await?;
		Ok(())
	}
}

/// Outcome of [`MigrationExecutor::apply_migrations`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
	pub applied: Vec<String>,
}

/// Applies and reverts [`Migration`]s against a pool.
pub struct MigrationExecutor {
	pool: SqlitePool,
	migrations: &'static [Migration],
	recorder: MigrationRecorder,
}

impl MigrationExecutor {
	/// Executor for the built-in [`MIGRATIONS`].
	pub fn new(pool: SqlitePool) -> Self {
		Self::with_migrations(pool, MIGRATIONS)
	}

	pub fn with_migrations(pool: SqlitePool, migrations: &'static [Migration]) -> Self {
		Self {
			pool,
			migrations,
			recorder: MigrationRecorder::new(),
		}
	}

	/// Names of migrations not yet applied, in application order.
	pub async fn plan(&self) -> Result<Vec<&'static str>> {
		self.recorder.ensure_schema_table(&self.pool).await?;
		let mut pending = Vec::new();
		for migration in self.migrations {
			if !self.recorder.is_applied(&self.pool, migration.name).await? {
				pending.push(migration.name);
			}
		}
		Ok(pending)
	}

	/// Apply every pending migration. Already-applied ones are skipped.
	pub async fn apply_migrations(&self) -> Result<ExecutionResult> {
		let mut applied = Vec::new();
		self.recorder.ensure_schema_table(&self.pool).await?;

		for migration in self.migrations {
			if self
				.recorder
				.is_applied(&self.pool, migration.name)
				.await?
			{
				continue;
			}

			let mut tx = self.pool.begin().await?;
			for &statement in migration.up {
				sqlx::query(statement)
					.execute(&mut *tx)
					.await
					.map_err(|e| {
						DatabaseError::Migration(format!("{} failed: {}", migration.name, e))
					})?;
			}
			self.recorder
				.record_applied(&mut *tx, migration.name)
				.await?;
			tx.commit().await?;

			info!(migration = migration.name, "applied migration");
			applied.push(migration.name.to_string());
		}

		Ok(ExecutionResult { applied })
	}

	/// Revert the most recently applied migration, if any.
	pub async fn rollback_last(&self) -> Result<Option<String>> {
		self.recorder.ensure_schema_table(&self.pool).await?;
		let applied = self.recorder.applied_migrations(&self.pool).await?;

		let Some(migration) = self
			.migrations
			.iter()
			.rev()
			.find(|m| applied.iter().any(|r| r.name == m.name))
		else {
			return Ok(None);
		};

		let mut tx = self.pool.begin().await?;
		for &statement in migration.down {
			sqlx::query(statement)
				.execute(&mut *tx)
				.await
				.map_err(|e| {
					DatabaseError::Migration(format!("reverting {} failed: {}", migration.name, e))
				})?;
		}
		self.recorder.unapply(&mut *tx, migration.name).await?;
		tx.commit().await?;

		info!(migration = migration.name, "reverted migration");
		Ok(Some(migration.name.to_string()))
	}
}

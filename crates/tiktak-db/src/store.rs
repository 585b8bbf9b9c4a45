//! The store handle: one SQLite pool plus typed queries over it.

use crate::config::DatabaseConfig;
use crate::migrations::{ExecutionResult, MigrationExecutor};
use crate::models::{Comment, CommentWithUser, Post, PostWithRelations, User};
use crate::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Author columns selected next to a post or comment by a left join.
#[derive(Debug, sqlx::FromRow)]
struct AuthorColumns {
	author_id: Option<i64>,
	author_username: Option<String>,
	author_created_at: Option<DateTime<Utc>>,
	author_updated_at: Option<DateTime<Utc>>,
}

impl AuthorColumns {
	fn into_user(self) -> Option<User> {
		Some(User {
			id: self.author_id?,
			username: self.author_username?,
			created_at: self.author_created_at?,
			updated_at: self.author_updated_at?,
		})
	}
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
	#[sqlx(flatten)]
	post: Post,
	#[sqlx(flatten)]
	author: AuthorColumns,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
	#[sqlx(flatten)]
	comment: Comment,
	#[sqlx(flatten)]
	author: AuthorColumns,
}

const AUTHOR_COLUMNS: &str = "u.id AS author_id, u.username AS author_username, \
	u.createdAt AS author_created_at, u.updatedAt AS author_updated_at";

/// Handle to the relational store.
///
/// Cloning is cheap and shares the underlying pool. The handle is opened
/// once at process start and closed with [`Store::close`] at shutdown.
#[derive(Debug, Clone)]
pub struct Store {
	pool: SqlitePool,
}

impl Store {
	/// Open a pool according to `config`, with foreign keys enforced on
	/// every connection.
	pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(&config.url)
			.map_err(|e| DatabaseError::Config(format!("invalid database URL '{}': {}", config.url, e)))?
			.create_if_missing(true)
			.foreign_keys(true);

		let mut pool_options =
			SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.acquire_timeout));

		pool_options = if config.is_in_memory() {
			pool_options
				.min_connections(1)
				.max_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
		} else {
			pool_options
				.min_connections(config.min_connections)
				.max_connections(config.max_connections)
				.idle_timeout(config.idle_timeout.map(Duration::from_secs))
				.max_lifetime(config.max_lifetime.map(Duration::from_secs))
		};

		let pool = pool_options.connect_with(options).await?;
		info!(url = %config.url, "opened store");
		Ok(Self { pool })
	}

	/// A fresh, private in-memory store with the schema applied.
	pub async fn in_memory() -> Result<Self> {
		let store = Self::connect(&DatabaseConfig::in_memory()).await?;
		store.migrate().await?;
		Ok(store)
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Apply all pending migrations.
	pub async fn migrate(&self) -> Result<ExecutionResult> {
		MigrationExecutor::new(self.pool.clone())
			.apply_migrations()
			.await
	}

	/// Revert the latest applied migration and return its name.
	pub async fn rollback(&self) -> Result<Option<String>> {
		MigrationExecutor::new(self.pool.clone())
			.rollback_last()
			.await
	}

	/// Close every pooled connection, waiting for checked-out ones.
	pub async fn close(&self) {
		self.pool.close().await;
		info!("closed store");
	}

	/// Insert a user. Usernames are not unique; no check is made.
	pub async fn create_user(&self, username: &str) -> Result<User> {
		let now = Utc::now();
		let user = sqlx::query_as::<_, User>(
			"INSERT INTO users (username, createdAt, updatedAt) VALUES (?, ?, ?)
			RETURNING id, username, createdAt, updatedAt",
		)
		.bind(username)
		.bind(now)
		.bind(now)
		.fetch_one(&self.pool)
		.await?;

		debug!(user_id = user.id, username, "created user");
		Ok(user)
	}

	/// Exact-match lookup. With duplicate usernames the oldest row wins.
	pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
		let user = sqlx::query_as::<_, User>(
			"SELECT id, username, createdAt, updatedAt FROM users
			WHERE username = ? ORDER BY id LIMIT 1",
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;
		Ok(user)
	}

	/// Create a post owned by the user named `username`.
	///
	/// The author lookup is part of the insert statement, so the write lock
	/// is taken before any row is read.
	pub async fn create_post(&self, username: &str, contents: &str) -> Result<Post> {
		let now = Utc::now();
		let post = sqlx::query_as::<_, Post>(
			"INSERT INTO posts (contents, userID, createdAt, updatedAt)
			SELECT ?, id, ?, ? FROM users WHERE username = ? ORDER BY id LIMIT 1
			RETURNING id, contents, userID, score, createdAt, updatedAt",
		)
		.bind(contents)
		.bind(now)
		.bind(now)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?
		.ok_or_else(|| DatabaseError::UserNotFound(username.to_string()))?;

		debug!(post_id = post.id, user_id = post.user_id, "created post");
		Ok(post)
	}

	/// Add a comment by `username` to post `post_id`.
	///
	/// The post's existence is not checked up front; a dangling `post_id` is
	/// rejected by the foreign key and surfaces as [`DatabaseError::Sqlx`].
	pub async fn create_comment(&self, username: &str, post_id: i64, contents: &str) -> Result<Comment> {
		let now = Utc::now();
		let comment = sqlx::query_as::<_, Comment>(
			"INSERT INTO comments (contents, postID, userID, createdAt, updatedAt)
			SELECT ?, ?, id, ?, ? FROM users WHERE username = ? ORDER BY id LIMIT 1
			RETURNING id, contents, postID, userID, createdAt, updatedAt",
		)
		.bind(contents)
		.bind(post_id)
		.bind(now)
		.bind(now)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?
		.ok_or_else(|| DatabaseError::UserNotFound(username.to_string()))?;

		debug!(comment_id = comment.id, post_id, user_id = comment.user_id, "created comment");
		Ok(comment)
	}

	/// Every post with its author and its comments (each with its author).
	///
	/// Posts are ordered by id ascending, and so are the comments of each
	/// post. Two queries are issued: one for posts, one for all comments.
	pub async fn list_posts(&self) -> Result<Vec<PostWithRelations>> {
		let posts = sqlx::query_as::<_, PostRow>(&format!(
			"SELECT p.id AS id, p.contents AS contents, p.userID AS userID, p.score AS score,
			p.createdAt AS createdAt, p.updatedAt AS updatedAt, {}
			FROM posts p LEFT JOIN users u ON u.id = p.userID
			ORDER BY p.id",
			AUTHOR_COLUMNS
		))
		.fetch_all(&self.pool)
		.await?;

		let comments = sqlx::query_as::<_, CommentRow>(&format!(
			"SELECT c.id AS id, c.contents AS contents, c.postID AS postID, c.userID AS userID,
			c.createdAt AS createdAt, c.updatedAt AS updatedAt, {}
			FROM comments c LEFT JOIN users u ON u.id = c.userID
			ORDER BY c.id",
			AUTHOR_COLUMNS
		))
		.fetch_all(&self.pool)
		.await?;

		let mut comments_by_post: HashMap<i64, Vec<CommentWithUser>> = HashMap::new();
		for row in comments {
			comments_by_post
				.entry(row.comment.post_id)
				.or_default()
				.push(CommentWithUser {
					comment: row.comment,
					user: row.author.into_user(),
				});
		}

		Ok(posts
			.into_iter()
			.map(|row| PostWithRelations {
				comments: comments_by_post.remove(&row.post.id).unwrap_or_default(),
				user: row.author.into_user(),
				post: row.post,
			})
			.collect())
	}
}

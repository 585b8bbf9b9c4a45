//! Demo data for a fresh database.

use crate::Result;
use crate::store::Store;
use tracing::info;

/// Counts of rows written by [`seed`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
	pub users: usize,
	pub posts: usize,
	pub comments: usize,
}

/// Insert two users, a post by each, and one comment on the second post.
pub async fn seed(store: &Store) -> Result<SeedSummary> {
	let first = store.create_user("cchyung").await?;
	let second = store.create_user("johndoe123").await?;

	store.create_post(&first.username, "hello world").await?;
	let reply_target = store
		.create_post(&second.username, "this is a second post")
		.await?;

	store
		.create_comment(&first.username, reply_target.id, "wow!")
		.await?;

	let summary = SeedSummary {
		users: 2,
		posts: 2,
		comments: 1,
	};
	info!(?summary, "seeded database");
	Ok(summary)
}

/// Delete every comment, post and user row. The schema itself is kept.
pub async fn unseed(store: &Store) -> Result<()> {
	let mut tx = store.pool().begin().await?;
	for table in ["comments", "posts", "users"] {
		sqlx::query(&format!("DELETE FROM {}", table))
			.execute(&mut *tx)
			.await?;
	}
	tx.commit().await?;
	info!("removed seed data");
	Ok(())
}

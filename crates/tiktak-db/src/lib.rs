//! # TikTak DB
//!
//! Persistence for TikTak: the SQLite schema and its migrations, the row
//! models, the [`Store`] handle that every request shares, and demo data.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiktak_db::{DatabaseConfig, Store};
//!
//! # async fn run() -> tiktak_db::Result<()> {
//! let store = Store::connect(&DatabaseConfig::new("sqlite://tiktak.db?mode=rwc")).await?;
//! store.migrate().await?;
//!
//! store.create_user("cchyung").await?;
//! store.create_post("cchyung", "hello world").await?;
//!
//! for post in store.list_posts().await? {
//!     println!("{}: {}", post.post.id, post.post.contents);
//! }
//! store.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod seed;
pub mod store;

pub use config::DatabaseConfig;
pub use error::{DatabaseError, Result};
pub use migrations::{ExecutionResult, MIGRATIONS, Migration, MigrationExecutor, MigrationRecorder};
pub use models::{Comment, CommentWithUser, Post, PostWithRelations, User};
pub use seed::{SeedSummary, seed, unseed};
pub use store::Store;

//! Client for the TikTak REST API.
//!
//! ```rust,no_run
//! # async fn run() -> tiktak_client::Result<()> {
//! let client = tiktak_client::Client::new("http://localhost:3000/api");
//! client.signup("cchyung").await?;
//! client.create_post("cchyung", "hello world").await?;
//! for post in client.list_posts().await? {
//!     println!("{} by {:?}", post.contents, post.username());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, DEFAULT_API_URL};
pub use error::{ClientError, Result};
pub use types::{FeedComment, FeedPost, FeedUser};

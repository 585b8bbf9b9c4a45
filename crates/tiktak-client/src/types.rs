//! Shapes of the JSON the API sends and accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedUser {
	pub id: i64,
	pub username: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedComment {
	pub id: i64,
	pub contents: String,
	#[serde(rename = "postID")]
	pub post_id: i64,
	#[serde(rename = "userID")]
	pub user_id: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub user: Option<FeedUser>,
}

/// One entry of `GET /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
	pub id: i64,
	pub contents: String,
	#[serde(rename = "userID")]
	pub user_id: i64,
	pub score: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub user: Option<FeedUser>,
	#[serde(default)]
	pub comments: Vec<FeedComment>,
}

impl FeedPost {
	/// Author's username, if the author row still exists.
	pub fn username(&self) -> Option<&str> {
		self.user.as_ref().map(|u| u.username.as_str())
	}
}

impl FeedComment {
	pub fn username(&self) -> Option<&str> {
		self.user.as_ref().map(|u| u.username.as_str())
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct UsernamePayload<'a> {
	pub username: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContentsPayload<'a> {
	pub username: &'a str,
	pub contents: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
	pub message: String,
}

//! Row types and the nested feed structures built from them.
//!
//! Serialized field names match the public JSON API (`userID`, `postID`,
//! `createdAt`, `updatedAt`), which are also the column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct User {
	pub id: i64,
	pub username: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Post {
	pub id: i64,
	pub contents: String,
	#[serde(rename = "userID")]
	#[sqlx(rename = "userID")]
	pub user_id: i64,
	/// Stored with a default of 1; nothing reads or changes it.
	pub score: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Comment {
	pub id: i64,
	pub contents: String,
	#[serde(rename = "postID")]
	#[sqlx(rename = "postID")]
	pub post_id: i64,
	#[serde(rename = "userID")]
	#[sqlx(rename = "userID")]
	pub user_id: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// A comment together with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentWithUser {
	#[serde(flatten)]
	pub comment: Comment,
	pub user: Option<User>,
}

/// A post together with its author and its comments.
///
/// `user` is `None` only when the author row is gone; the schema's foreign
/// keys make that unreachable through the store's own operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithRelations {
	#[serde(flatten)]
	pub post: Post,
	pub user: Option<User>,
	pub comments: Vec<CommentWithUser>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;

	fn at(secs: i64) -> DateTime<Utc> {
		Utc.timestamp_opt(secs, 0).unwrap()
	}

	#[test]
	fn test_feed_json_shape() {
		let author = User {
			id: 2,
			username: "johndoe123".to_string(),
			created_at: at(0),
			updated_at: at(0),
		};
		let commenter = User {
			id: 1,
			username: "cchyung".to_string(),
			created_at: at(0),
			updated_at: at(0),
		};
		let entry = PostWithRelations {
			post: Post {
				id: 2,
				contents: "this is a second post".to_string(),
				user_id: 2,
				score: 1,
				created_at: at(10),
				updated_at: at(10),
			},
			user: Some(author),
			comments: vec![CommentWithUser {
				comment: Comment {
					id: 1,
					contents: "wow!".to_string(),
					post_id: 2,
					user_id: 1,
					created_at: at(20),
					updated_at: at(20),
				},
				user: Some(commenter),
			}],
		};

		let value = serde_json::to_value(&entry).unwrap();

		assert_eq!(value["id"], json!(2));
		assert_eq!(value["userID"], json!(2));
		assert_eq!(value["score"], json!(1));
		assert_eq!(value["user"]["username"], json!("johndoe123"));
		assert_eq!(value["comments"][0]["postID"], json!(2));
		assert_eq!(value["comments"][0]["user"]["username"], json!("cchyung"));
		assert!(value.get("createdAt").is_some());
		assert!(value.get("post").is_none());
	}
}

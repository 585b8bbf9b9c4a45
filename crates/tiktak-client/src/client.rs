use crate::error::{ClientError, Result};
use crate::types::{ContentsPayload, FeedPost, MessageBody, UsernamePayload};
use tracing::debug;

/// Default API root of a locally running server.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Thin wrapper over the REST API. One method per endpoint.
#[derive(Debug, Clone)]
pub struct Client {
	base_url: String,
	http: reqwest::Client,
}

impl Default for Client {
	fn default() -> Self {
		Self::new(DEFAULT_API_URL)
	}
}

impl Client {
	/// `base_url` is the API root, e.g. `http://localhost:3000/api`.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self::with_http_client(base_url, reqwest::Client::new())
	}

	pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
		let base_url = base_url.into().trim_end_matches('/').to_string();
		Self { base_url, http }
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	/// `POST /signup`. Returns the confirmation text.
	pub async fn signup(&self, username: &str) -> Result<String> {
		let response = self
			.http
			.post(self.url("/signup"))
			.json(&UsernamePayload { username })
			.send()
			.await?;
		let response = check(response).await?;
		Ok(response.text().await?)
	}

	/// `POST /login`. Fails with [`ClientError::Status`] for unknown users.
	pub async fn login(&self, username: &str) -> Result<String> {
		let response = self
			.http
			.post(self.url("/login"))
			.json(&UsernamePayload { username })
			.send()
			.await?;
		message(response).await
	}

	/// `POST /posts`.
	pub async fn create_post(&self, username: &str, contents: &str) -> Result<String> {
		let response = self
			.http
			.post(self.url("/posts"))
			.json(&ContentsPayload { username, contents })
			.send()
			.await?;
		message(response).await
	}

	/// `GET /posts`.
	pub async fn list_posts(&self) -> Result<Vec<FeedPost>> {
		let response = self.http.get(self.url("/posts")).send().await?;
		let posts: Vec<FeedPost> = check(response).await?.json().await?;
		debug!(count = posts.len(), "fetched feed");
		Ok(posts)
	}

	/// `POST /posts/{id}`.
	pub async fn add_comment(&self, username: &str, post_id: i64, contents: &str) -> Result<String> {
		let response = self
			.http
			.post(self.url(&format!("/posts/{}", post_id)))
			.json(&ContentsPayload { username, contents })
			.send()
			.await?;
		message(response).await
	}
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}
	let body = response.text().await.unwrap_or_default();
	debug!(status = status.as_u16(), %body, "request rejected");
	Err(ClientError::Status {
		status: status.as_u16(),
		body,
	})
}

async fn message(response: reqwest::Response) -> Result<String> {
	let body: MessageBody = check(response).await?.json().await?;
	Ok(body.message)
}

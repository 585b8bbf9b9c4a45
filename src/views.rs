//! Request handlers for the REST API.
//!
//! Each view holds a [`Store`] handle and implements [`Handler`] for one
//! method and path; see [`crate::urls`] for the wiring.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tiktak_db::{DatabaseError, Store};
use tiktak_http::{Error, Handler, Request, Response, Result, StatusCode};
use tracing::{error, warn};

pub const LOGIN_SUCCEEDED: &str = "login successful";
pub const LOGIN_FAILED: &str = "could not log in with supplied username";
pub const POST_CREATED: &str = "post successfully created!";
pub const COMMENT_ADDED: &str = "comment successfully added!";
pub const WELCOME: &str = "Welcome to the TikTak REST API";

/// Body of `/signup` and `/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernamePayload {
	pub username: String,
}

/// Body of `POST /posts` and `POST /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentsPayload {
	pub username: String,
	pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

fn message(status: StatusCode, text: &str) -> Result<Response> {
	Response::new(status).with_json(&MessageResponse::new(text))
}

fn store_error(operation: &str, err: DatabaseError) -> Error {
	error!(operation, error = %err, "store operation failed");
	Error::Database(err.to_string())
}

/// `POST /signup`
pub struct SignUpView {
	store: Store,
}

impl SignUpView {
	pub fn new(store: Store) -> Self {
		Self { store }
	}
}

#[async_trait]
impl Handler for SignUpView {
	async fn handle(&self, request: Request) -> Result<Response> {
		let payload: UsernamePayload = request.json()?;
		let user = self
			.store
			.create_user(&payload.username)
			.await
			.map_err(|e| store_error("signup", e))?;

		Ok(Response::ok().with_text(format!("user {} successfully created!", user.username)))
	}
}

/// `POST /login`
///
/// Only checks that the username exists. Failures of any kind answer with
/// the same fixed message.
pub struct LoginView {
	store: Store,
}

impl LoginView {
	pub fn new(store: Store) -> Self {
		Self { store }
	}
}

#[async_trait]
impl Handler for LoginView {
	async fn handle(&self, request: Request) -> Result<Response> {
		let payload: UsernamePayload = request.json()?;

		match self.store.find_user_by_username(&payload.username).await {
			Ok(Some(_)) => message(StatusCode::OK, LOGIN_SUCCEEDED),
			Ok(None) => {
				warn!(username = %payload.username, "login for unknown user");
				message(StatusCode::INTERNAL_SERVER_ERROR, LOGIN_FAILED)
			}
			Err(e) => {
				error!(username = %payload.username, error = %e, "login lookup failed");
				message(StatusCode::INTERNAL_SERVER_ERROR, LOGIN_FAILED)
			}
		}
	}
}

/// `POST /posts`
pub struct CreatePostView {
	store: Store,
}

impl CreatePostView {
	pub fn new(store: Store) -> Self {
		Self { store }
	}
}

#[async_trait]
impl Handler for CreatePostView {
	async fn handle(&self, request: Request) -> Result<Response> {
		let payload: ContentsPayload = request.json()?;
		self.store
			.create_post(&payload.username, &payload.contents)
			.await
			.map_err(|e| store_error("create_post", e))?;

		message(StatusCode::OK, POST_CREATED)
	}
}

/// `GET /posts`
pub struct ListPostsView {
	store: Store,
}

impl ListPostsView {
	pub fn new(store: Store) -> Self {
		Self { store }
	}
}

#[async_trait]
impl Handler for ListPostsView {
	async fn handle(&self, _request: Request) -> Result<Response> {
		let posts = self
			.store
			.list_posts()
			.await
			.map_err(|e| store_error("list_posts", e))?;

		Response::ok().with_json(&posts)
	}
}

/// `POST /posts/{id}`
pub struct AddCommentView {
	store: Store,
}

impl AddCommentView {
	pub fn new(store: Store) -> Self {
		Self { store }
	}
}

#[async_trait]
impl Handler for AddCommentView {
	async fn handle(&self, request: Request) -> Result<Response> {
		let post_id: i64 = request.parse_path_param("id")?;
		let payload: ContentsPayload = request.json()?;
		self.store
			.create_comment(&payload.username, post_id, &payload.contents)
			.await
			.map_err(|e| store_error("add_comment", e))?;

		message(StatusCode::OK, COMMENT_ADDED)
	}
}

/// `GET /`
pub struct WelcomeView;

#[async_trait]
impl Handler for WelcomeView {
	async fn handle(&self, _request: Request) -> Result<Response> {
		message(StatusCode::OK, WELCOME)
	}
}

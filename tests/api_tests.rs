//! End-to-end API tests
//!
//! Every test gets its own in-memory store and a server on an ephemeral
//! port, wired exactly as `manage runserver` wires it.
//!
//! # Test Categories
//!
//! - Endpoints: sign-up, login, posts, comments, welcome
//! - Error path: unknown users, dangling posts, malformed input, routing
//! - CORS
//! - Terminal client flows against the live server

use reqwest::StatusCode;
use rstest::*;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tiktak::ui::{self, Outcome, Session, UiError};
use tiktak::{Settings, app};
use tiktak_client::Client;
use tiktak_db::Store;
use tiktak_server::ShutdownCoordinator;
use tokio::net::TcpListener;

// =============================================================================
// Test Fixtures
// =============================================================================

struct TestServer {
	addr: SocketAddr,
	store: Store,
	http: reqwest::Client,
	coordinator: ShutdownCoordinator,
}

impl TestServer {
	fn url(&self, path: &str) -> String {
		format!("http://{}{}", self.addr, path)
	}

	fn client(&self) -> Client {
		Client::new(self.url("/api"))
	}

	async fn post_json(&self, path: &str, body: Value) -> reqwest::Response {
		self.http.post(self.url(path)).json(&body).send().await.unwrap()
	}

	async fn get(&self, path: &str) -> reqwest::Response {
		self.http.get(self.url(path)).send().await.unwrap()
	}

	async fn feed(&self) -> Value {
		let response = self.get("/api/posts").await;
		assert_eq!(response.status(), StatusCode::OK);
		response.json().await.unwrap()
	}
}

impl Drop for TestServer {
	fn drop(&mut self) {
		self.coordinator.shutdown();
	}
}

#[fixture]
async fn server() -> TestServer {
	let store = Store::in_memory().await.expect("store should open");
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));

	let server = app::build_server(&store).expect("routes should compile");
	tokio::spawn(server.serve_with_shutdown(listener, coordinator.clone()));

	TestServer {
		addr,
		store,
		http: reqwest::Client::new(),
		coordinator,
	}
}

#[fixture]
fn session_dir() -> tempfile::TempDir {
	tempfile::tempdir().unwrap()
}

// =============================================================================
// Endpoints
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_welcome(#[future] server: TestServer) {
	let server = server.await;

	let response = server.get("/").await;

	assert_eq!(response.status(), StatusCode::OK);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body, json!({"message": "Welcome to the TikTak REST API"}));
}

#[rstest]
#[tokio::test]
async fn test_signup_returns_plain_text(#[future] server: TestServer) {
	let server = server.await;

	let response = server.post_json("/api/signup", json!({"username": "cchyung"})).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert!(
		response.headers()["content-type"]
			.to_str()
			.unwrap()
			.starts_with("text/plain")
	);
	assert_eq!(response.text().await.unwrap(), "user cchyung successfully created!");
}

#[rstest]
#[tokio::test]
async fn test_signup_then_login_succeeds(#[future] server: TestServer) {
	let server = server.await;
	server.post_json("/api/signup", json!({"username": "cchyung"})).await;

	let response = server.post_json("/api/login", json!({"username": "cchyung"})).await;

	assert_eq!(response.status(), StatusCode::OK);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body, json!({"message": "login successful"}));
}

#[rstest]
#[tokio::test]
async fn test_login_unknown_user_fails_with_fixed_message(#[future] server: TestServer) {
	let server = server.await;

	let response = server.post_json("/api/login", json!({"username": "ghost"})).await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body, json!({"message": "could not log in with supplied username"}));
	assert_eq!(server.store.find_user_by_username("ghost").await.unwrap(), None);
}

#[rstest]
#[tokio::test]
async fn test_list_posts_empty(#[future] server: TestServer) {
	let server = server.await;

	assert_eq!(server.feed().await, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_created_post_appears_in_feed(#[future] server: TestServer) {
	let server = server.await;
	server.post_json("/api/signup", json!({"username": "alice"})).await;

	// Act
	let response = server
		.post_json("/api/posts", json!({"username": "alice", "contents": "first!"}))
		.await;

	// Assert
	assert_eq!(response.status(), StatusCode::OK);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body, json!({"message": "post successfully created!"}));

	let feed = server.feed().await;
	assert_eq!(feed.as_array().unwrap().len(), 1);
	assert_eq!(feed[0]["contents"], "first!");
	assert_eq!(feed[0]["score"], 1);
	assert_eq!(feed[0]["user"]["username"], "alice");
	assert_eq!(feed[0]["userID"], feed[0]["user"]["id"]);
	assert_eq!(feed[0]["comments"], json!([]));
}

#[rstest]
#[tokio::test]
async fn test_added_comment_appears_under_post(#[future] server: TestServer) {
	let server = server.await;
	server.post_json("/api/signup", json!({"username": "alice"})).await;
	server.post_json("/api/signup", json!({"username": "bob"})).await;
	server
		.post_json("/api/posts", json!({"username": "alice", "contents": "hi"}))
		.await;
	let post_id = server.feed().await[0]["id"].as_i64().unwrap();

	// Act
	let response = server
		.post_json(
			&format!("/api/posts/{}", post_id),
			json!({"username": "bob", "contents": "hello back"}),
		)
		.await;

	// Assert
	assert_eq!(response.status(), StatusCode::OK);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body, json!({"message": "comment successfully added!"}));

	let comments = server.feed().await[0]["comments"].clone();
	assert_eq!(comments.as_array().unwrap().len(), 1);
	assert_eq!(comments[0]["contents"], "hello back");
	assert_eq!(comments[0]["postID"], post_id);
	assert_eq!(comments[0]["user"]["username"], "bob");
}

#[rstest]
#[tokio::test]
async fn test_seed_scenario_feed(#[future] server: TestServer) {
	let server = server.await;
	tiktak_db::seed(&server.store).await.unwrap();

	let feed = server.feed().await;

	let posts = feed.as_array().unwrap();
	assert_eq!(posts.len(), 2);

	assert_eq!(posts[0]["contents"], "hello world");
	assert_eq!(posts[0]["user"]["username"], "cchyung");
	assert_eq!(posts[0]["comments"], json!([]));

	assert_eq!(posts[1]["contents"], "this is a second post");
	assert_eq!(posts[1]["user"]["username"], "johndoe123");
	let comments = posts[1]["comments"].as_array().unwrap();
	assert_eq!(comments.len(), 1);
	assert_eq!(comments[0]["contents"], "wow!");
	assert_eq!(comments[0]["user"]["username"], "cchyung");
	for key in ["id", "createdAt", "updatedAt", "userID", "postID"] {
		assert!(comments[0].get(key).is_some(), "comment is missing {key}");
	}
}

// =============================================================================
// Error Path
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_post_by_unknown_user_is_server_error(#[future] server: TestServer) {
	let server = server.await;

	let response = server
		.post_json("/api/posts", json!({"username": "ghost", "contents": "boo"}))
		.await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	let body: Value = response.json().await.unwrap();
	assert!(body["error"].is_string());
	assert_eq!(server.feed().await, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_comment_on_missing_post_is_server_error(#[future] server: TestServer) {
	let server = server.await;
	server.post_json("/api/signup", json!({"username": "alice"})).await;

	let response = server
		.post_json("/api/posts/999", json!({"username": "alice", "contents": "anyone?"}))
		.await;

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	let body: Value = response.json().await.unwrap();
	assert!(body["error"].is_string());
}

#[rstest]
#[case("/api/posts/abc")]
#[case("/api/posts/1.5")]
#[tokio::test]
async fn test_non_numeric_post_id_is_bad_request(#[future] server: TestServer, #[case] path: &str) {
	let server = server.await;

	let response = server
		.post_json(path, json!({"username": "alice", "contents": "hm"}))
		.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn test_malformed_json_is_bad_request(#[future] server: TestServer) {
	let server = server.await;

	let response = server
		.http
		.post(server.url("/api/signup"))
		.header("content-type", "application/json")
		.body("{not json")
		.send()
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body: Value = response.json().await.unwrap();
	assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
}

#[rstest]
#[tokio::test]
async fn test_unknown_route_is_not_found(#[future] server: TestServer) {
	let server = server.await;

	let response = server.get("/api/nothing").await;

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_wrong_method_is_not_allowed(#[future] server: TestServer) {
	let server = server.await;

	let response = server.http.delete(server.url("/api/posts")).send().await.unwrap();

	assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// CORS
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_preflight_is_no_content(#[future] server: TestServer) {
	let server = server.await;

	let response = server
		.http
		.request(reqwest::Method::OPTIONS, server.url("/api/posts"))
		.header("origin", "http://localhost:3001")
		.header("access-control-request-method", "POST")
		.send()
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	assert_eq!(response.headers()["access-control-allow-origin"], "*");
	let methods = response.headers()["access-control-allow-methods"].to_str().unwrap();
	assert!(methods.contains("POST"));
}

#[rstest]
#[case("/")]
#[case("/api/posts")]
#[case("/api/missing")]
#[tokio::test]
async fn test_every_response_allows_any_origin(#[future] server: TestServer, #[case] path: &str) {
	let server = server.await;

	let response = server.get(path).await;

	assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

// =============================================================================
// Client Flows
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_sign_up_flow_persists_username(#[future] server: TestServer, session_dir: tempfile::TempDir) {
	let server = server.await;
	let session = Session::new(session_dir.path().join("session"));

	let outcome = ui::sign_up(&server.client(), &session, "cchyung").await.unwrap();

	assert_eq!(outcome, Outcome::Done("user cchyung successfully created!".to_string()));
	assert_eq!(session.current_username().unwrap().as_deref(), Some("cchyung"));
}

#[rstest]
#[tokio::test]
async fn test_login_flow_rejects_unknown_user(#[future] server: TestServer, session_dir: tempfile::TempDir) {
	let server = server.await;
	let session = Session::new(session_dir.path().join("session"));

	let err = ui::log_in(&server.client(), &session, "ghost").await.unwrap_err();

	assert_eq!(err.to_string(), "Could not login with username ghost");
	assert_eq!(session.current_username().unwrap(), None);
	assert_eq!(server.store.find_user_by_username("ghost").await.unwrap(), None);
}

#[rstest]
#[tokio::test]
async fn test_empty_username_sends_nothing(#[future] server: TestServer, session_dir: tempfile::TempDir) {
	let server = server.await;
	let session = Session::new(session_dir.path().join("session"));

	let outcome = ui::sign_up(&server.client(), &session, "").await.unwrap();

	assert_eq!(outcome, Outcome::Skipped);
	assert_eq!(session.current_username().unwrap(), None);
}

#[rstest]
#[tokio::test]
async fn test_compose_flow(#[future] server: TestServer, session_dir: tempfile::TempDir) {
	let server = server.await;
	let client = server.client();
	let session = Session::new(session_dir.path().join("session"));

	// Not logged in yet
	let err = ui::create_post(&client, &session, "too early").await.unwrap_err();
	assert!(matches!(err, UiError::NotLoggedIn));

	ui::sign_up(&client, &session, "alice").await.unwrap();

	// Empty contents are ignored
	assert_eq!(ui::create_post(&client, &session, "").await.unwrap(), Outcome::Skipped);
	assert_eq!(server.feed().await, json!([]));

	let outcome = ui::create_post(&client, &session, "hello").await.unwrap();
	assert_eq!(outcome, Outcome::Done("post successfully created!".to_string()));

	let posts = client.list_posts().await.unwrap();
	assert_eq!(posts.len(), 1);

	assert_eq!(ui::add_comment(&client, &session, posts[0].id, "").await.unwrap(), Outcome::Skipped);
	let outcome = ui::add_comment(&client, &session, posts[0].id, "me again").await.unwrap();
	assert_eq!(outcome, Outcome::Done("comment successfully added!".to_string()));

	let posts = client.list_posts().await.unwrap();
	assert_eq!(posts[0].comments.len(), 1);
	assert_eq!(posts[0].comments[0].username(), Some("alice"));
}

#[rstest]
#[tokio::test]
async fn test_username_with_spaces_can_post(#[future] server: TestServer, session_dir: tempfile::TempDir) {
	let server = server.await;
	let client = server.client();
	let session = Session::new(session_dir.path().join("session"));

	ui::sign_up(&client, &session, " bob ").await.unwrap();
	let outcome = ui::create_post(&client, &session, "spaced out").await.unwrap();

	assert_eq!(outcome, Outcome::Done("post successfully created!".to_string()));
	let posts = client.list_posts().await.unwrap();
	assert_eq!(posts[0].username(), Some(" bob "));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_serve_migrates_and_stops_on_shutdown() {
	let settings = Settings {
		database_url: "sqlite::memory:".to_string(),
		..Settings::default()
	};
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));

	let task = tokio::spawn({
		let coordinator = coordinator.clone();
		async move { app::serve(&settings, listener, coordinator).await }
	});

	let client = Client::new(format!("http://{}/api", addr));
	let mut posts = None;
	for _ in 0..50 {
		if let Ok(found) = client.list_posts().await {
			posts = Some(found);
			break;
		}
		tokio::time::sleep(Duration::from_millis(20)).await;
	}
	assert_eq!(posts, Some(Vec::new()), "server should answer with an empty feed");

	coordinator.shutdown();
	assert!(coordinator.wait_for_shutdown().await);
	task.await.unwrap().unwrap();
}

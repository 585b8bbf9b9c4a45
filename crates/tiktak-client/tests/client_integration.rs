//! Client integration tests against a stub API served on an ephemeral port.

use rstest::*;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tiktak_client::{Client, ClientError};
use tiktak_http::{Handler, Request, Response, Router, StatusCode};
use tiktak_server::{HttpServer, ShutdownCoordinator};
use tokio::net::TcpListener;

/// Records every JSON body it receives and answers with a fixed response.
struct Stub {
	seen: Arc<Mutex<Vec<Value>>>,
	reply: fn(&Request, &Value) -> Response,
}

#[async_trait::async_trait]
impl Handler for Stub {
	async fn handle(&self, request: Request) -> tiktak_http::Result<Response> {
		let body: Value = if request.body.is_empty() {
			Value::Null
		} else {
			request.json()?
		};
		let response = (self.reply)(&request, &body);
		self.seen.lock().unwrap().push(body);
		Ok(response)
	}
}

struct StubApi {
	client: Client,
	seen: Arc<Mutex<Vec<Value>>>,
	coordinator: ShutdownCoordinator,
}

impl Drop for StubApi {
	fn drop(&mut self) {
		self.coordinator.shutdown();
	}
}

fn stub(seen: &Arc<Mutex<Vec<Value>>>, reply: fn(&Request, &Value) -> Response) -> Arc<Stub> {
	Arc::new(Stub {
		seen: seen.clone(),
		reply,
	})
}

#[fixture]
async fn api() -> StubApi {
	let seen = Arc::new(Mutex::new(Vec::new()));

	let routes = Router::new()
		.post(
			"/signup",
			stub(&seen, |_, body| {
				Response::ok().with_text(format!("user {} successfully created!", body["username"].as_str().unwrap()))
			}),
		)
		.unwrap()
		.post(
			"/login",
			stub(&seen, |_, body| {
				if body["username"] == "ghost" {
					Response::internal_server_error()
						.with_json(&json!({"message": "could not log in with supplied username"}))
						.unwrap()
				} else {
					Response::ok().with_json(&json!({"message": "login successful"})).unwrap()
				}
			}),
		)
		.unwrap()
		.get(
			"/posts",
			stub(&seen, |_, _| {
				Response::ok()
					.with_json(&json!([{
						"id": 1,
						"contents": "hello world",
						"userID": 1,
						"score": 1,
						"createdAt": "2020-08-31T22:09:29.754Z",
						"updatedAt": "2020-08-31T22:09:29.754Z",
						"user": {
							"id": 1,
							"username": "cchyung",
							"createdAt": "2020-08-31T22:09:29.719Z",
							"updatedAt": "2020-08-31T22:09:29.719Z"
						},
						"comments": []
					}]))
					.unwrap()
			}),
		)
		.unwrap()
		.post(
			"/posts",
			stub(&seen, |_, _| {
				Response::ok().with_json(&json!({"message": "post successfully created!"})).unwrap()
			}),
		)
		.unwrap()
		.post(
			"/posts/{id}",
			stub(&seen, |request, _| {
				assert_eq!(request.path_param("id"), Some("7"));
				Response::ok().with_json(&json!({"message": "comment successfully added!"})).unwrap()
			}),
		)
		.unwrap();
	let router = Router::new().include("/api", routes).unwrap();

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
	tokio::spawn(HttpServer::new(Arc::new(router)).serve_with_shutdown(listener, coordinator.clone()));

	StubApi {
		client: Client::new(format!("http://{}/api/", addr)),
		seen,
		coordinator,
	}
}

#[rstest]
#[tokio::test]
async fn test_signup_returns_confirmation_text(#[future] api: StubApi) {
	let api = api.await;

	let text = api.client.signup("cchyung").await.unwrap();

	assert_eq!(text, "user cchyung successfully created!");
	assert_eq!(api.seen.lock().unwrap()[0], json!({"username": "cchyung"}));
}

#[rstest]
#[tokio::test]
async fn test_login_success_message(#[future] api: StubApi) {
	let api = api.await;

	assert_eq!(api.client.login("cchyung").await.unwrap(), "login successful");
}

#[rstest]
#[tokio::test]
async fn test_login_rejection_carries_status(#[future] api: StubApi) {
	let api = api.await;

	let err = api.client.login("ghost").await.unwrap_err();

	assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR.as_u16()));
	assert!(matches!(err, ClientError::Status { ref body, .. } if body.contains("could not log in")));
}

#[rstest]
#[tokio::test]
async fn test_create_post_sends_username_and_contents(#[future] api: StubApi) {
	let api = api.await;

	let message = api.client.create_post("cchyung", "hi").await.unwrap();

	assert_eq!(message, "post successfully created!");
	assert_eq!(
		api.seen.lock().unwrap()[0],
		json!({"username": "cchyung", "contents": "hi"})
	);
}

#[rstest]
#[tokio::test]
async fn test_add_comment_targets_post_path(#[future] api: StubApi) {
	let api = api.await;

	let message = api.client.add_comment("cchyung", 7, "nice").await.unwrap();

	assert_eq!(message, "comment successfully added!");
}

#[rstest]
#[tokio::test]
async fn test_list_posts_decodes_feed(#[future] api: StubApi) {
	let api = api.await;

	let posts = api.client.list_posts().await.unwrap();

	assert_eq!(posts.len(), 1);
	assert_eq!(posts[0].contents, "hello world");
	assert_eq!(posts[0].username(), Some("cchyung"));
	assert!(posts[0].comments.is_empty());
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);

	let err = Client::new(format!("http://{}/api", addr))
		.list_posts()
		.await
		.unwrap_err();

	assert!(matches!(err, ClientError::Http(_)));
	assert_eq!(err.status(), None);
}

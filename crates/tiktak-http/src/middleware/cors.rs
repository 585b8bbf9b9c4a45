use crate::{Handler, Middleware, Request, Response, Result};
use async_trait::async_trait;
use hyper::Method;
use hyper::header::{self, HeaderValue};
use std::sync::Arc;

pub struct CorsConfig {
	pub allow_origins: Vec<String>,
	pub allow_methods: Vec<String>,
	pub allow_headers: Vec<String>,
	pub max_age: Option<u64>,
}

impl Default for CorsConfig {
	fn default() -> Self {
		Self {
			allow_origins: vec!["*".to_string()],
			allow_methods: vec![
				"GET".to_string(),
				"HEAD".to_string(),
				"PUT".to_string(),
				"PATCH".to_string(),
				"POST".to_string(),
				"DELETE".to_string(),
			],
			allow_headers: vec!["Content-Type".to_string()],
			max_age: None,
		}
	}
}

/// Adds CORS headers to every response and answers `OPTIONS` preflights.
///
/// Errors from the inner handler are rendered into responses here so that
/// browsers can still read them cross-origin.
pub struct CorsMiddleware {
	config: CorsConfig,
}

impl CorsMiddleware {
	pub fn new(config: CorsConfig) -> Self {
		Self { config }
	}

	/// Allow every origin with the common methods.
	pub fn permissive() -> Self {
		Self::new(CorsConfig::default())
	}

	fn header_value(values: &[String]) -> HeaderValue {
		HeaderValue::from_str(&values.join(", ")).unwrap_or_else(|_| HeaderValue::from_static("*"))
	}
}

#[async_trait]
impl Middleware for CorsMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if request.method == Method::OPTIONS {
			let mut response = Response::no_content();
			response.headers.insert(
				header::ACCESS_CONTROL_ALLOW_ORIGIN,
				Self::header_value(&self.config.allow_origins),
			);
			response.headers.insert(
				header::ACCESS_CONTROL_ALLOW_METHODS,
				Self::header_value(&self.config.allow_methods),
			);
			response.headers.insert(
				header::ACCESS_CONTROL_ALLOW_HEADERS,
				Self::header_value(&self.config.allow_headers),
			);
			if let Some(max_age) = self.config.max_age {
				response
					.headers
					.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
			}
			return Ok(response);
		}

		let mut response = next.handle(request).await.unwrap_or_else(Response::from);
		response.headers.insert(
			header::ACCESS_CONTROL_ALLOW_ORIGIN,
			Self::header_value(&self.config.allow_origins),
		);
		Ok(response)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use hyper::StatusCode;

	struct TestHandler;

	#[async_trait]
	impl Handler for TestHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body("test response"))
		}
	}

	struct FailingHandler;

	#[async_trait]
	impl Handler for FailingHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Err(Error::Database("disk I/O error".to_string()))
		}
	}

	#[tokio::test]
	async fn test_preflight_request() {
		let middleware = CorsMiddleware::new(CorsConfig {
			max_age: Some(7200),
			..CorsConfig::default()
		});
		let request = Request::builder()
			.method(Method::OPTIONS)
			.uri("/api/posts")
			.build()
			.unwrap();

		let response = middleware
			.process(request, Arc::new(TestHandler))
			.await
			.unwrap();

		assert_eq!(response.status, StatusCode::NO_CONTENT);
		assert_eq!(
			response.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
			"*"
		);
		let methods = response
			.headers
			.get(header::ACCESS_CONTROL_ALLOW_METHODS)
			.unwrap()
			.to_str()
			.unwrap();
		assert!(methods.contains("GET"));
		assert!(methods.contains("POST"));
		assert_eq!(
			response.headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(),
			"7200"
		);
	}

	#[tokio::test]
	async fn test_regular_request_keeps_body() {
		let middleware = CorsMiddleware::permissive();
		let request = Request::builder().uri("/api/posts").build().unwrap();

		let response = middleware
			.process(request, Arc::new(TestHandler))
			.await
			.unwrap();

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(response.text(), "test response");
		assert!(response
			.headers
			.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
	}

	#[tokio::test]
	async fn test_errors_are_rendered_with_cors_headers() {
		let middleware = CorsMiddleware::permissive();
		let request = Request::builder().uri("/api/posts").build().unwrap();

		let response = middleware
			.process(request, Arc::new(FailingHandler))
			.await
			.unwrap();

		assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(response
			.headers
			.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
	}
}

use crate::{Handler, Middleware, Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Emits one log event per request.
///
/// `GET /api/posts - 200 (5 ms)` at `info`, 4xx at `warn`, 5xx and handler
/// errors at `error`. The peer address is recorded when the server set it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.clone();
		let path = request.path().to_string();
		let peer = request
			.remote_addr
			.map_or_else(|| "-".to_string(), |addr| addr.to_string());

		let result = next.handle(request).await;
		let elapsed_ms = start.elapsed().as_millis() as u64;

		match &result {
			Ok(response) if response.status.is_server_error() => {
				error!(%peer, %method, %path, status = response.status.as_u16(), elapsed_ms, "request failed");
			}
			Ok(response) if response.status.is_client_error() => {
				warn!(%peer, %method, %path, status = response.status.as_u16(), elapsed_ms, "request rejected");
			}
			Ok(response) => {
				info!(%peer, %method, %path, status = response.status.as_u16(), elapsed_ms, "request handled");
			}
			Err(err) if err.status_code() >= 500 => {
				error!(%peer, %method, %path, status = err.status_code(), elapsed_ms, error = %err, "request failed");
			}
			Err(err) => {
				warn!(%peer, %method, %path, status = err.status_code(), elapsed_ms, error = %err, "request rejected");
			}
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;

	struct NotFoundHandler;

	#[async_trait]
	impl Handler for NotFoundHandler {
		async fn handle(&self, request: Request) -> Result<Response> {
			Err(Error::NotFound(request.path().to_string()))
		}
	}

	#[tokio::test]
	async fn test_passes_errors_through() {
		let request = Request::builder().uri("/missing").build().unwrap();

		let result = LoggingMiddleware::new()
			.process(request, Arc::new(NotFoundHandler))
			.await;

		assert!(matches!(result, Err(Error::NotFound(path)) if path == "/missing"));
	}
}

use crate::{Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Handler trait for processing requests
/// This is the core abstraction - views, the router and middleware chains all implement it
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Blanket implementation for `Arc<T>` where T: Handler
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing
#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

/// Middleware chain - composes multiple middleware around a handler.
///
/// Middleware run in the order they were added: the first one added sees the
/// request first and the response last.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}

	pub fn len(&self) -> usize {
		self.middlewares.len()
	}

	pub fn is_empty(&self) -> bool {
		self.middlewares.is_empty()
	}
}

/// One link of the chain: a middleware plus everything after it.
struct Next {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Next {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();
		for middleware in self.middlewares.iter().rev() {
			current = Arc::new(Next {
				middleware: middleware.clone(),
				next: current,
			});
		}
		current.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct TestHandler;

	#[async_trait]
	impl Handler for TestHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body("Hello, World!"))
		}
	}

	struct PrefixMiddleware {
		prefix: String,
	}

	#[async_trait]
	impl Middleware for PrefixMiddleware {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let current_body = response.text();
			Ok(Response::ok().with_body(format!("{}{}", self.prefix, current_body)))
		}
	}

	#[tokio::test]
	async fn test_empty_chain_calls_handler() {
		let chain = MiddlewareChain::new(Arc::new(TestHandler));
		assert!(chain.is_empty());

		let response = chain.handle(Request::builder().build().unwrap()).await.unwrap();
		assert_eq!(response.text(), "Hello, World!");
	}

	#[tokio::test]
	async fn test_middleware_chain_execution_order() {
		let chain = MiddlewareChain::new(Arc::new(TestHandler))
			.with_middleware(Arc::new(PrefixMiddleware {
				prefix: "First:".to_string(),
			}))
			.with_middleware(Arc::new(PrefixMiddleware {
				prefix: "Second:".to_string(),
			}));
		assert_eq!(chain.len(), 2);

		let response = chain.handle(Request::builder().build().unwrap()).await.unwrap();

		// First -> Second -> Handler
		assert_eq!(response.text(), "First:Second:Hello, World!");
	}
}

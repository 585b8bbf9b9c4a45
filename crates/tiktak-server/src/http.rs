use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tiktak_http::{Handler, Middleware, MiddlewareChain, Request, Response};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::shutdown::ShutdownCoordinator;
use crate::{Result, ServerError};

/// HTTP/1.1 server with middleware support
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
}

impl HttpServer {
	/// Create a new server with the given handler
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
		}
	}

	/// Add a middleware. The first one added sees each request first.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	/// The handler requests are dispatched to, middlewares included.
	pub fn handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return self.handler.clone();
		}

		let mut chain = MiddlewareChain::new(self.handler.clone());
		for middleware in &self.middlewares {
			chain.add_middleware(middleware.clone());
		}

		Arc::new(chain)
	}

	/// Serve on an already bound listener until `coordinator` requests
	/// shutdown. Open connections are dropped when that happens.
	pub async fn serve_with_shutdown(self, listener: TcpListener, coordinator: ShutdownCoordinator) -> Result<()> {
		let local_addr = listener.local_addr()?;
		info!(addr = %local_addr, "server listening on http://{}", local_addr);

		let handler = self.handler();
		let mut shutdown_rx = coordinator.subscribe();

		if !coordinator.is_shutting_down() {
			loop {
				tokio::select! {
					result = listener.accept() => {
						let (stream, remote_addr) = match result {
							Ok(accepted) => accepted,
							Err(e) => {
								warn!(error = %e, "failed to accept connection");
								continue;
							}
						};
						let handler = handler.clone();
						let mut conn_shutdown = coordinator.subscribe();

						tokio::task::spawn(async move {
							tokio::select! {
								result = Self::handle_connection(stream, remote_addr, handler) => {
									if let Err(err) = result {
										debug!(%remote_addr, error = %err, "connection closed with error");
									}
								}
								_ = conn_shutdown.recv() => {}
							}
						});
					}
					_ = shutdown_rx.recv() => {
						info!("shutdown signal received, stopping server");
						break;
					}
				}
			}
		}

		coordinator.notify_shutdown_complete();
		Ok(())
	}

	/// Serve HTTP/1.1 requests on one accepted connection.
	pub async fn handle_connection(stream: TcpStream, remote_addr: SocketAddr, handler: Arc<dyn Handler>) -> Result<()> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};

		http1::Builder::new()
			.serve_connection(io, service)
			.await
			.map_err(ServerError::Connection)
	}
}

/// Adapts a [`Handler`] to hyper's `Service`.
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = hyper::Error;
	type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body = body.collect().await?.to_bytes();

			let mut request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);
			request.remote_addr = Some(remote_addr);

			let response = handler
				.handle(request)
				.await
				.unwrap_or_else(Response::from);

			let mut hyper_response = hyper::Response::new(Full::new(response.body));
			*hyper_response.status_mut() = response.status;
			*hyper_response.headers_mut() = response.headers;
			Ok(hyper_response)
		})
	}
}

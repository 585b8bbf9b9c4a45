//! HTTP server for TikTak.
//!
//! Serves a [`tiktak_http::Handler`] over HTTP/1.1 with hyper, one Tokio task
//! per connection, and stops cleanly through a [`ShutdownCoordinator`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tiktak_server::{HttpServer, ShutdownCoordinator, shutdown_signal};
//! # use tiktak_http::{Handler, Request, Response};
//! # struct Hello;
//! # #[async_trait::async_trait]
//! # impl Handler for Hello {
//! #     async fn handle(&self, _req: Request) -> tiktak_http::Result<Response> {
//! #         Ok(Response::ok().with_text("hello"))
//! #     }
//! # }
//!
//! # async fn run() -> tiktak_server::Result<()> {
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
//! let trigger = coordinator.clone();
//! tokio::spawn(async move {
//!     shutdown_signal().await;
//!     trigger.shutdown();
//! });
//!
//! HttpServer::new(Arc::new(Hello))
//!     .serve_with_shutdown(listener, coordinator)
//!     .await
//! # }
//! ```

pub mod http;
pub mod shutdown;

pub use http::HttpServer;
pub use shutdown::{ShutdownCoordinator, shutdown_signal};

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("connection error: {0}")]
	Connection(#[source] hyper::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;

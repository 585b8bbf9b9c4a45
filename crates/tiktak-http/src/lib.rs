//! HTTP building blocks for TikTak.
//!
//! A request travels through a [`MiddlewareChain`] into a [`Router`], which
//! picks a [`Handler`] by method and path:
//!
//! ```rust,ignore
//! use tiktak_http::{MiddlewareChain, Router};
//! use tiktak_http::middleware::{CorsMiddleware, LoggingMiddleware};
//!
//! let router = Router::new().get("/posts", Arc::new(ListPosts))?;
//! let app = MiddlewareChain::new(Arc::new(router))
//!     .with_middleware(Arc::new(CorsMiddleware::permissive()))
//!     .with_middleware(Arc::new(LoggingMiddleware::new()));
//! ```

pub mod error;
pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;

pub use error::{Error, Result};
pub use handler::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use router::{PathPattern, Resolution, Router};

// Re-exported so downstream crates agree on one set of HTTP types.
pub use hyper::{HeaderMap, Method, StatusCode, Uri, Version};

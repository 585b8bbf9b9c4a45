//! Middleware applied around the application router.

pub mod cors;
pub mod logging;

pub use cors::{CorsConfig, CorsMiddleware};
pub use logging::LoggingMiddleware;

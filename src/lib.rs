//! # TikTak
//!
//! A minimal social-posting service. Users sign up with a username, write
//! text posts and comment on them; a terminal client renders the feed.
//!
//! The workspace is split by concern:
//!
//! - [`tiktak_http`]: request/response types, handlers, middleware, routing
//! - [`tiktak_db`]: the SQLite store, its migrations and seed data
//! - [`tiktak_server`]: the hyper server and graceful shutdown
//! - [`tiktak_client`]: a typed client for the REST API
//!
//! This crate ties them together: [`views`] and [`urls`] define the API,
//! [`app`] boots it, [`ui`] is the terminal front end and the `manage`
//! binary exposes all of it on the command line.
//!
//! ## Running
//!
//! ```text
//! manage migrate
//! manage seed
//! manage runserver --port 3000
//! manage feed --comments
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;
pub mod urls;
pub mod views;

pub use config::{ConfigError, Settings};
pub use error::{AppError, Result};

//! Terminal front end: the sign-up/login flow, the feed, and composing
//! posts and comments as the current user.

pub mod compose;
pub mod feed;
pub mod session;
pub mod signup;

pub use compose::{add_comment, create_post};
pub use feed::{FeedOptions, render_feed};
pub use session::Session;
pub use signup::{log_in, log_out, sign_up};

use thiserror::Error;
use tiktak_client::ClientError;

#[derive(Debug, Error)]
pub enum UiError {
	#[error("Could not sign up with username {0}")]
	SignUp(String),

	#[error("Could not login with username {0}")]
	Login(String),

	#[error("not logged in; run `manage login <username>` first")]
	NotLoggedIn,

	#[error(transparent)]
	Client(#[from] ClientError),

	#[error("session file error: {0}")]
	Session(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UiError>;

/// What a form submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// The request succeeded; carries the server's message.
	Done(String),
	/// Empty input; nothing was sent.
	Skipped,
}

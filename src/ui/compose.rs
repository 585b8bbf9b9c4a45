//! Posting and commenting as the current user.
//!
//! Empty contents are ignored without contacting the server. A failed
//! request leaves the session untouched.

use super::{Outcome, Result, Session, UiError};
use tiktak_client::Client;

fn current_user(session: &Session) -> Result<String> {
	session.current_username()?.ok_or(UiError::NotLoggedIn)
}

pub async fn create_post(client: &Client, session: &Session, contents: &str) -> Result<Outcome> {
	let username = current_user(session)?;
	if contents.is_empty() {
		return Ok(Outcome::Skipped);
	}
	let message = client.create_post(&username, contents).await?;
	Ok(Outcome::Done(message))
}

pub async fn add_comment(client: &Client, session: &Session, post_id: i64, contents: &str) -> Result<Outcome> {
	let username = current_user(session)?;
	if contents.is_empty() {
		return Ok(Outcome::Skipped);
	}
	let message = client.add_comment(&username, post_id, contents).await?;
	Ok(Outcome::Done(message))
}

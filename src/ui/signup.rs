use super::{Outcome, Result, Session, UiError};
use tiktak_client::Client;
use tracing::debug;

/// Create the user and remember them as the current username.
pub async fn sign_up(client: &Client, session: &Session, username: &str) -> Result<Outcome> {
	if username.is_empty() {
		return Ok(Outcome::Skipped);
	}
	let message = client.signup(username).await.map_err(|e| {
		debug!(error = %e, "sign-up failed");
		UiError::SignUp(username.to_string())
	})?;
	session.save(username)?;
	Ok(Outcome::Done(message))
}

/// Remember `username` as current if the server knows it.
///
/// Unknown usernames are rejected; nothing is created.
pub async fn log_in(client: &Client, session: &Session, username: &str) -> Result<Outcome> {
	if username.is_empty() {
		return Ok(Outcome::Skipped);
	}
	let message = client.login(username).await.map_err(|e| {
		debug!(error = %e, "login failed");
		UiError::Login(username.to_string())
	})?;
	session.save(username)?;
	Ok(Outcome::Done(message))
}

pub fn log_out(session: &Session) -> Result<()> {
	session.clear()?;
	Ok(())
}

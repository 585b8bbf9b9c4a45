//! Terminal rendering of the feed.

use console::style;
use std::fmt::Write;
use tiktak_client::{FeedComment, FeedPost};

const UNKNOWN_AUTHOR: &str = "(unknown user)";

/// What the feed screen shows besides the posts themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedOptions<'a> {
	pub current_username: Option<&'a str>,
	/// Expand every post's comment list.
	pub show_comments: bool,
}

/// Render the whole feed screen.
pub fn render_feed(posts: &[FeedPost], options: FeedOptions<'_>) -> String {
	let mut out = String::new();

	let _ = writeln!(out, "{}", style("TikTak").bold());
	match options.current_username {
		Some(username) => {
			let _ = writeln!(out, "Welcome, {}", style(username).cyan());
		}
		None => {
			let _ = writeln!(out, "{}", style("Sign Up/Login").underlined());
		}
	}
	let _ = writeln!(out);
	let _ = writeln!(out, "{}", style("Posts").bold());

	for post in posts {
		let _ = writeln!(out);
		out.push_str(&render_post(post, options.show_comments));
	}
	out
}

/// One post: a toggle marker, the id, contents, author and optionally the
/// comment list.
pub fn render_post(post: &FeedPost, show_comments: bool) -> String {
	let mut out = String::new();
	let toggle = if show_comments { "-" } else { "+" };

	let _ = writeln!(out, "{} {} {}", style(toggle).dim(), style(format!("#{}", post.id)).dim(), post.contents);
	let _ = writeln!(out, "    {}", style(post.username().unwrap_or(UNKNOWN_AUTHOR)).bold());

	if show_comments {
		for line in render_comments(&post.comments).lines() {
			let _ = writeln!(out, "    {}", line);
		}
	}
	out
}

pub fn render_comments(comments: &[FeedComment]) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", style("Comments").bold());

	if comments.is_empty() {
		let _ = writeln!(out, "{}", style("No comments for this post.").dim());
		return out;
	}
	for comment in comments {
		let _ = writeln!(
			out,
			"{} says: {}",
			comment.username().unwrap_or(UNKNOWN_AUTHOR),
			comment.contents
		);
	}
	out
}

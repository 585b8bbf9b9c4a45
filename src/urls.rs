//! URL configuration.

use crate::views::{AddCommentView, CreatePostView, ListPostsView, LoginView, SignUpView, WelcomeView};
use std::sync::Arc;
use tiktak_db::Store;
use tiktak_http::{Result, Router};

/// Routes served below `/api`.
pub fn api_routes(store: &Store) -> Result<Router> {
	Router::new()
		.post("/signup", Arc::new(SignUpView::new(store.clone())))?
		.post("/login", Arc::new(LoginView::new(store.clone())))?
		.get("/posts", Arc::new(ListPostsView::new(store.clone())))?
		.post("/posts", Arc::new(CreatePostView::new(store.clone())))?
		.post("/posts/{id}", Arc::new(AddCommentView::new(store.clone())))
}

/// The complete routing table.
pub fn url_patterns(store: &Store) -> Result<Router> {
	Router::new()
		.get("/", Arc::new(WelcomeView))?
		.include("/api", api_routes(store)?)
}

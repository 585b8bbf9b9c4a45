//! Path pattern matching and method-based routing.
//!
//! Patterns use the `{name}` placeholder syntax:
//! - `/posts` - Exact match (a single trailing slash is tolerated)
//! - `/posts/{id}` - Single path parameter, never spans a `/`
//!
//! Routers nest: [`Router::include`] mounts every route of another router
//! under a prefix, which is how the API is served below `/api`.

use crate::{Error, Handler, Request, Response, Result};
use async_trait::async_trait;
use hyper::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20;

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	regex: regex::Regex,
	param_names: Vec<String>,
}

impl PathPattern {
	/// Compile a pattern string.
	///
	/// # Examples
	///
	/// ```
	/// use tiktak_http::PathPattern;
	///
	/// let pattern = PathPattern::new("/posts/{id}").unwrap();
	/// let params = pattern.matches("/posts/42").unwrap();
	/// assert_eq!(params.get("id"), Some(&"42".to_string()));
	/// assert!(pattern.matches("/posts").is_none());
	/// ```
	pub fn new(pattern: &str) -> Result<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(Error::Internal(format!(
				"Pattern length {} exceeds maximum allowed length of {} bytes",
				pattern.len(),
				MAX_PATTERN_LENGTH
			)));
		}
		if !pattern.starts_with('/') {
			return Err(Error::Internal(format!(
				"Pattern '{}' must start with '/'",
				pattern
			)));
		}

		let (regex_str, param_names) = Self::compile_pattern(pattern)?;
		let regex = regex::RegexBuilder::new(&regex_str)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| Error::Internal(format!("Failed to compile pattern regex: {}", e)))?;

		Ok(Self {
			pattern: pattern.to_string(),
			regex,
			param_names,
		})
	}

	fn compile_pattern(pattern: &str) -> Result<(String, Vec<String>)> {
		let mut regex_str = String::from("^");
		let mut param_names = Vec::new();
		let mut chars = pattern.chars();

		while let Some(c) = chars.next() {
			match c {
				'{' => {
					let mut param = String::new();
					loop {
						match chars.next() {
							Some('}') => break,
							Some(next) if next.is_ascii_alphanumeric() || next == '_' => {
								param.push(next)
							}
							_ => {
								return Err(Error::Internal(format!(
									"Malformed parameter in pattern '{}'",
									pattern
								)));
							}
						}
					}
					if param.is_empty() || param_names.contains(&param) {
						return Err(Error::Internal(format!(
							"Empty or duplicate parameter in pattern '{}'",
							pattern
						)));
					}
					regex_str.push_str(&format!("(?P<{}>[^/]+)", param));
					param_names.push(param);
				}
				_ => regex_str.push_str(&regex::escape(&c.to_string())),
			}
		}

		if !pattern.ends_with('/') {
			regex_str.push_str("/?");
		}
		regex_str.push('$');
		Ok((regex_str, param_names))
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Match `path`, returning the extracted parameters on success.
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		self.regex.captures(path).map(|caps| {
			self.param_names
				.iter()
				.filter_map(|name| {
					caps.name(name)
						.map(|m| (name.clone(), m.as_str().to_string()))
				})
				.collect()
		})
	}
}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

struct Route {
	method: Method,
	pattern: PathPattern,
	handler: Arc<dyn Handler>,
}

/// Outcome of resolving a request against a [`Router`].
pub enum Resolution {
	Matched {
		handler: Arc<dyn Handler>,
		params: HashMap<String, String>,
	},
	MethodNotAllowed {
		allowed: Vec<Method>,
	},
	NotFound,
}

/// Method + path router.
///
/// Routes are tried in registration order; the first one whose pattern and
/// method both match wins.
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `handler` for `method` requests matching `pattern`.
	pub fn route(mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.routes.push(Route {
			method,
			pattern: PathPattern::new(pattern)?,
			handler,
		});
		Ok(self)
	}

	pub fn get(self, pattern: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::GET, pattern, handler)
	}

	pub fn post(self, pattern: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		self.route(Method::POST, pattern, handler)
	}

	/// Mount every route of `other` below `prefix`.
	///
	/// # Examples
	///
	/// ```
	/// # use std::sync::Arc;
	/// # use tiktak_http::{Handler, Request, Response, Router, Resolution};
	/// # use hyper::Method;
	/// # struct Posts;
	/// # #[async_trait::async_trait]
	/// # impl Handler for Posts {
	/// #     async fn handle(&self, _r: Request) -> tiktak_http::Result<Response> { Ok(Response::ok()) }
	/// # }
	/// let api = Router::new().get("/posts", Arc::new(Posts)).unwrap();
	/// let root = Router::new().include("/api", api).unwrap();
	///
	/// assert!(matches!(root.resolve(&Method::GET, "/api/posts"), Resolution::Matched { .. }));
	/// assert!(matches!(root.resolve(&Method::GET, "/posts"), Resolution::NotFound));
	/// ```
	pub fn include(mut self, prefix: &str, other: Router) -> Result<Self> {
		let prefix = prefix.trim_end_matches('/');
		for route in other.routes {
			let joined = if route.pattern.pattern() == "/" && !prefix.is_empty() {
				prefix.to_string()
			} else {
				format!("{}{}", prefix, route.pattern.pattern())
			};
			self.routes.push(Route {
				method: route.method,
				pattern: PathPattern::new(&joined)?,
				handler: route.handler,
			});
		}
		Ok(self)
	}

	/// Registered `(method, pattern)` pairs in order.
	pub fn routes(&self) -> Vec<(Method, String)> {
		self.routes
			.iter()
			.map(|r| (r.method.clone(), r.pattern.pattern().to_string()))
			.collect()
	}

	pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
		let mut allowed = Vec::new();
		for route in &self.routes {
			if let Some(params) = route.pattern.matches(path) {
				if route.method == *method {
					return Resolution::Matched {
						handler: route.handler.clone(),
						params,
					};
				}
				allowed.push(route.method.clone());
			}
		}

		if allowed.is_empty() {
			Resolution::NotFound
		} else {
			Resolution::MethodNotAllowed { allowed }
		}
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		match self.resolve(&request.method, request.path()) {
			Resolution::Matched { handler, params } => {
				for (key, value) in params {
					request.set_path_param(key, value);
				}
				handler.handle(request).await
			}
			Resolution::MethodNotAllowed { allowed } => {
				let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
				Err(Error::MethodNotAllowed(format!(
					"{} {} (allowed: {})",
					request.method,
					request.path(),
					allowed.join(", ")
				)))
			}
			Resolution::NotFound => Err(Error::NotFound(request.path().to_string())),
		}
	}
}

use crate::{Error, Result};
use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, Uri, Version};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

/// HTTP request as seen by handlers.
///
/// The body is fully buffered by the server before the request reaches the
/// handler chain. Path parameters are filled in by the [`Router`](crate::Router).
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub path_params: HashMap<String, String>,
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	/// Create a new request from its parts.
	///
	/// # Examples
	///
	/// ```
	/// use tiktak_http::Request;
	/// use hyper::{HeaderMap, Method, Uri, Version};
	/// use bytes::Bytes;
	///
	/// let request = Request::new(
	///     Method::GET,
	///     Uri::from_static("/api/posts"),
	///     Version::HTTP_11,
	///     HeaderMap::new(),
	///     Bytes::new(),
	/// );
	/// assert_eq!(request.path(), "/api/posts");
	/// ```
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			remote_addr: None,
		}
	}

	/// Start building a request.
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Get the request path
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Deserialize the body as JSON.
	///
	/// A body that is not valid JSON for `T` is a [`Error::BadRequest`].
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		serde_json::from_slice(&self.body)
			.map_err(|e| Error::BadRequest(format!("invalid JSON body: {}", e)))
	}

	/// Get a raw path parameter.
	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	/// Parse a path parameter into `T`.
	///
	/// # Examples
	///
	/// ```
	/// use tiktak_http::Request;
	/// use hyper::Method;
	///
	/// let mut request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/api/posts/7")
	///     .build()
	///     .unwrap();
	/// request.set_path_param("id", "7");
	///
	/// let id: i64 = request.parse_path_param("id").unwrap();
	/// assert_eq!(id, 7);
	/// ```
	pub fn parse_path_param<T: FromStr>(&self, name: &str) -> Result<T> {
		let raw = self
			.path_param(name)
			.ok_or_else(|| Error::BadRequest(format!("missing path parameter '{}'", name)))?;
		raw.parse()
			.map_err(|_| Error::BadRequest(format!("invalid path parameter '{}': {}", name, raw)))
	}

	/// Set a path parameter (used by the router for path variable extraction)
	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}
}

/// Builder for [`Request`], mostly useful in tests.
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: String,
	headers: HeaderMap,
	body: Bytes,
	invalid_header: Option<String>,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			headers: HeaderMap::new(),
			body: Bytes::new(),
			invalid_header: None,
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn header(mut self, name: &str, value: &str) -> Self {
		match (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			(Ok(name), Ok(value)) => {
				self.headers.insert(name, value);
			}
			_ => self.invalid_header = Some(name.to_string()),
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serialize `data` as the body and set `Content-Type: application/json`.
	pub fn json<T: Serialize>(mut self, data: &T) -> Self {
		match serde_json::to_vec(data) {
			Ok(body) => {
				self.body = Bytes::from(body);
				self.headers
					.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
			}
			Err(_) => self.invalid_header = Some("body".to_string()),
		}
		self
	}

	pub fn build(self) -> Result<Request> {
		if let Some(name) = self.invalid_header {
			return Err(Error::BadRequest(format!("invalid request part: {}", name)));
		}
		let uri = self
			.uri
			.parse::<Uri>()
			.map_err(|e| Error::BadRequest(format!("invalid URI '{}': {}", self.uri, e)))?;
		Ok(Request::new(
			self.method,
			uri,
			Version::HTTP_11,
			self.headers,
			self.body,
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, Deserialize, PartialEq)]
	struct Payload {
		username: String,
	}

	#[test]
	fn test_json_body() {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/api/signup")
			.json(&serde_json::json!({"username": "cchyung"}))
			.build()
			.unwrap();

		let payload: Payload = request.json().unwrap();
		assert_eq!(
			payload,
			Payload {
				username: "cchyung".to_string()
			}
		);
		assert_eq!(
			request.headers.get(CONTENT_TYPE).unwrap(),
			"application/json"
		);
	}

	#[test]
	fn test_malformed_json_is_bad_request() {
		let request = Request::builder()
			.method(Method::POST)
			.body("{not json")
			.build()
			.unwrap();

		let err = request.json::<Payload>().unwrap_err();
		assert_eq!(err.status_code(), 400);
	}

	#[test]
	fn test_parse_path_param_rejects_non_numeric() {
		let mut request = Request::builder().uri("/api/posts/abc").build().unwrap();
		request.set_path_param("id", "abc");

		let err = request.parse_path_param::<i64>("id").unwrap_err();
		assert!(matches!(err, Error::BadRequest(_)));
	}

	#[test]
	fn test_missing_path_param() {
		let request = Request::builder().build().unwrap();
		assert!(request.parse_path_param::<i64>("id").is_err());
	}
}

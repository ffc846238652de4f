//! Request/outcome model and the transport contract the gate executes against.
//!
//! Callers describe work with [`Request`]; the gate resolves it into an [`HttpRequest`]
//! (absolute URL, timeout) and hands it to an [`HttpTransport`]. Transports report every HTTP
//! response as an [`Outcome`], whatever its status, and reserve [`TransportError`] for
//! exchanges that produced no response. Status policy (2xx for gated requests, exactly 200 for
//! grant exchanges) belongs to the gate, not the transport.

// std
use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method,
	header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<Outcome, TransportError>> + 'a + Send>>;

/// Caller-supplied request descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
	/// Absolute URL, or a path resolved against the configured base URL.
	pub url: String,
	/// HTTP method name.
	pub method: String,
	/// Headers sent verbatim.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
}
impl Request {
	/// Creates a `GET` request for `url`.
	pub fn get(url: impl Into<String>) -> Self {
		Self { url: url.into(), method: "GET".into(), headers: BTreeMap::new(), body: None }
	}

	/// Creates a `POST` request for `url`.
	pub fn post(url: impl Into<String>) -> Self {
		Self::get(url).method("POST")
	}

	/// Overrides the method.
	pub fn method(mut self, method: impl Into<String>) -> Self {
		self.method = method.into();

		self
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Attaches a JSON body.
	pub fn json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Returns a copy carrying `Authorization: Bearer <token>`; `self` is left untouched.
	pub fn with_bearer(&self, token: &str) -> Self {
		self.clone().header(AUTHORIZATION, format!("Bearer {token}"))
	}
}

/// Header name the gate injects for bearer authentication.
pub const AUTHORIZATION: &str = "Authorization";

/// Fully resolved request handed to an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
	/// Absolute target URL.
	pub url: Url,
	/// HTTP method name.
	pub method: String,
	/// Headers set exactly as given.
	pub headers: BTreeMap<String, String>,
	/// Body serialized as a JSON string when present.
	pub body: Option<serde_json::Value>,
	/// Upper bound for the exchange.
	pub timeout: Option<StdDuration>,
}

/// Result of an HTTP exchange that produced a response.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: String,
	/// Parsed body, present only when the response declared a JSON content type.
	pub json: Option<serde_json::Value>,
	/// Headers that were sent with the request.
	pub request_headers: BTreeMap<String, String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl Outcome {
	/// Builds an outcome with no JSON body, echoed headers, or retry hint.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self {
			status,
			body: body.into(),
			json: None,
			request_headers: BTreeMap::new(),
			retry_after: None,
		}
	}

	/// Builds an outcome, parsing `body` when `content_type` declares JSON.
	///
	/// A body that claims to be JSON but fails to parse leaves [`Outcome::json`] empty; the raw
	/// text stays available.
	pub fn from_response(status: u16, content_type: Option<&str>, body: String) -> Self {
		let json = content_type
			.filter(|value| is_json_content_type(value))
			.and_then(|_| serde_json::from_str(&body).ok());

		Self { json, ..Self::new(status, body) }
	}

	/// Records the headers that were sent.
	pub fn with_request_headers(mut self, headers: BTreeMap<String, String>) -> Self {
		self.request_headers = headers;

		self
	}

	/// Records a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Whether the status is in `[200, 300)`.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns an echoed request header by exact name.
	pub fn request_header(&self, name: &str) -> Option<&str> {
		self.request_headers.get(name).map(String::as_str)
	}
}

/// Transport contract consumed by the gate.
///
/// Implementations must set headers exactly as given, serialize [`HttpRequest::body`] as a JSON
/// string when present, honour [`HttpRequest::timeout`], and echo the sent headers in
/// [`Outcome::request_headers`]. Every HTTP response, including 4xx/5xx, resolves to `Ok`.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes one HTTP exchange.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Reqwest-backed [`HttpTransport`]; every call creates and discards its own request.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn build(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
		let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
			TransportError::InvalidRequest { message: format!("unknown method `{}`", request.method) }
		})?;
		let mut headers = HeaderMap::with_capacity(request.headers.len());

		for (name, value) in &request.headers {
			let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
				TransportError::InvalidRequest { message: format!("invalid header name `{name}`") }
			})?;
			let value = HeaderValue::from_str(value).map_err(|_| {
				TransportError::InvalidRequest { message: format!("invalid value for `{name}`") }
			})?;

			headers.insert(name, value);
		}

		let mut builder = self.0.request(method, request.url.clone()).headers(headers);

		if let Some(body) = &request.body {
			builder = builder.body(serde_json::to_vec(body)?);
		}
		if let Some(timeout) = request.timeout {
			builder = builder.timeout(timeout);
		}

		Ok(builder)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let response = self.build(&request)?.send().await?;
			let status = response.status().as_u16();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let retry_after = response
				.headers()
				.get(RETRY_AFTER)
				.and_then(|value| value.to_str().ok())
				.and_then(parse_retry_after);
			let body = response.text().await?;

			Ok(Outcome::from_response(status, content_type.as_deref(), body)
				.with_request_headers(request.headers)
				.with_retry_after(retry_after))
		})
	}
}

/// Whether a `Content-Type` value declares JSON (`application/json` or a `+json` suffix).
pub fn is_json_content_type(value: &str) -> bool {
	let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

	essence == "application/json"
		|| (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Parses a `Retry-After` value given either as delay-seconds or as an HTTP date.
pub fn parse_retry_after(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

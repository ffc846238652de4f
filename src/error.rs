//! Gate-level error types shared across grants, transports, and stores.

// self
use crate::{_prelude::*, http::Outcome};

/// Gate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gate error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Server answered with a status the gate treats as a failure.
	#[error("Server responded with HTTP {}.", .0.status)]
	Status(Box<Outcome>),
	/// Token endpoint answered 200 with a body that is not a token pair.
	#[error("Token endpoint returned a malformed token response.")]
	TokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Exchange outcome that failed to decode.
		outcome: Box<Outcome>,
	},
}
impl Error {
	/// Returns the HTTP outcome attached to this failure, if the server responded at all.
	pub fn outcome(&self) -> Option<&Outcome> {
		match self {
			Self::Status(outcome) | Self::TokenResponse { outcome, .. } => Some(outcome),
			_ => None,
		}
	}

	/// Returns the HTTP status attached to this failure, if any.
	pub fn status(&self) -> Option<u16> {
		self.outcome().map(|outcome| outcome.status)
	}

	/// Whether the server rejected the bearer token (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status(outcome) if outcome.status == 401)
	}
}
impl From<Outcome> for Error {
	fn from(outcome: Outcome) -> Self {
		Self::Status(Box::new(outcome))
	}
}

/// Configuration and validation failures raised by the gate.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request or token URI cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Relative URI used without a configured base URL.
	#[error("URL `{url}` is relative but no base URL is configured.")]
	MissingBaseUrl {
		/// Offending URL string.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout, request encoding).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while executing the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The exchange did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout,
	/// Method or headers cannot be expressed on the wire.
	#[error("Request is invalid: {message}.")]
	InvalidRequest {
		/// Human-readable reason.
		message: String,
	},
	/// JSON body could not be serialized.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[from] serde_json::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

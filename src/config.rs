//! Client configuration and merge-style reconfiguration.
//!
//! [`ClientConfig`] is the immutable snapshot every exchange reads; [`ConfigPatch`] carries the
//! fields a caller wants to change. Applying a patch is a shallow merge: every field present in
//! the patch wins, every absent field keeps its current value.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError, token::Secret};

/// Token endpoint used when none is configured.
pub const DEFAULT_TOKEN_URI: &str = "/token";

/// Resolved client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Token endpoint used by both grants; relative values resolve against `base_url`.
	pub token_uri: String,
	/// OAuth 2.0 client identifier.
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret.
	pub client_secret: Option<Secret>,
	/// Resource owner username for the password grant.
	pub username: Option<String>,
	/// Resource owner password for the password grant.
	pub password: Option<Secret>,
	/// Origin used to resolve relative request and token URIs.
	pub base_url: Option<Url>,
	/// Upper bound applied to every HTTP exchange.
	pub timeout: Option<StdDuration>,
	/// Coalesces overlapping authenticate/refresh exchanges when true.
	pub single_flight: bool,
}
impl ClientConfig {
	/// Sets the token endpoint.
	pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
		self.token_uri = token_uri.into();

		self
	}

	/// Sets the client identifier and secret.
	pub fn with_client(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the resource owner credentials.
	pub fn with_user(mut self, username: impl Into<String>, password: impl Into<Secret>) -> Self {
		self.username = Some(username.into());
		self.password = Some(password.into());

		self
	}

	/// Sets the origin used for relative URIs.
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);

		self
	}

	/// Sets the per-exchange timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Enables or disables authenticate/refresh coalescing.
	pub fn with_single_flight(mut self, enabled: bool) -> Self {
		self.single_flight = enabled;

		self
	}

	/// Merges `patch` over the current values.
	pub fn merge(&mut self, patch: ConfigPatch) {
		let ConfigPatch {
			token_uri,
			client_id,
			client_secret,
			username,
			password,
			base_url,
			timeout,
			single_flight,
		} = patch;

		if let Some(value) = token_uri {
			self.token_uri = value;
		}
		if let Some(value) = client_id {
			self.client_id = Some(value);
		}
		if let Some(value) = client_secret {
			self.client_secret = Some(value);
		}
		if let Some(value) = username {
			self.username = Some(value);
		}
		if let Some(value) = password {
			self.password = Some(value);
		}
		if let Some(value) = base_url {
			self.base_url = Some(value);
		}
		if let Some(value) = timeout {
			self.timeout = Some(value);
		}
		if let Some(value) = single_flight {
			self.single_flight = value;
		}
	}

	/// Resolves `raw` into an absolute URL, joining relative values onto `base_url`.
	pub fn resolve_url(&self, raw: &str) -> Result<Url, ConfigError> {
		match Url::parse(raw) {
			Ok(url) => Ok(url),
			Err(url::ParseError::RelativeUrlWithoutBase) => {
				let base = self
					.base_url
					.as_ref()
					.ok_or_else(|| ConfigError::MissingBaseUrl { url: raw.to_owned() })?;

				base.join(raw)
					.map_err(|source| ConfigError::InvalidUrl { url: raw.to_owned(), source })
			},
			Err(source) => Err(ConfigError::InvalidUrl { url: raw.to_owned(), source }),
		}
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			token_uri: DEFAULT_TOKEN_URI.into(),
			client_id: None,
			client_secret: None,
			username: None,
			password: None,
			base_url: None,
			timeout: None,
			single_flight: false,
		}
	}
}

/// Partial configuration applied through [`ClientConfig::merge`].
///
/// Deserializes from the camelCase keys used by browser callers (`tokenUri`, `clientId`, ...)
/// as well as snake_case. `timeout` is expressed in milliseconds on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigPatch {
	/// Token endpoint.
	#[serde(alias = "tokenUri")]
	pub token_uri: Option<String>,
	/// Client identifier.
	#[serde(alias = "clientId")]
	pub client_id: Option<String>,
	/// Client secret.
	#[serde(alias = "clientSecret")]
	pub client_secret: Option<Secret>,
	/// Resource owner username.
	pub username: Option<String>,
	/// Resource owner password.
	pub password: Option<Secret>,
	/// Origin for relative URIs.
	#[serde(alias = "baseUrl")]
	pub base_url: Option<Url>,
	/// Per-exchange timeout.
	#[serde(deserialize_with = "de_timeout_ms")]
	pub timeout: Option<StdDuration>,
	/// Authenticate/refresh coalescing toggle.
	#[serde(alias = "singleFlight")]
	pub single_flight: Option<bool>,
}
impl ConfigPatch {
	/// Sets the token endpoint.
	pub fn token_uri(mut self, value: impl Into<String>) -> Self {
		self.token_uri = Some(value.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl Into<Secret>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Sets the username.
	pub fn username(mut self, value: impl Into<String>) -> Self {
		self.username = Some(value.into());

		self
	}

	/// Sets the password.
	pub fn password(mut self, value: impl Into<Secret>) -> Self {
		self.password = Some(value.into());

		self
	}

	/// Sets the base URL.
	pub fn base_url(mut self, value: Url) -> Self {
		self.base_url = Some(value);

		self
	}

	/// Sets the per-exchange timeout.
	pub fn timeout(mut self, value: StdDuration) -> Self {
		self.timeout = Some(value);

		self
	}

	/// Sets the coalescing toggle.
	pub fn single_flight(mut self, value: bool) -> Self {
		self.single_flight = Some(value);

		self
	}
}

fn de_timeout_ms<'de, D>(deserializer: D) -> Result<Option<StdDuration>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(<Option<u64>>::deserialize(deserializer)?.map(StdDuration::from_millis))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_point_at_token_endpoint() {
		let config = ClientConfig::default();

		assert_eq!(config.token_uri, "/token");
		assert!(config.client_id.is_none());
		assert!(config.password.is_none());
		assert!(!config.single_flight);
	}

	#[test]
	fn merge_overrides_only_present_fields() {
		let mut config = ClientConfig::default().with_client("azerty", "abc123");

		config.merge(ConfigPatch::default().token_uri("/oauth/v2/token").username("john@mail.com"));

		assert_eq!(config.token_uri, "/oauth/v2/token");
		assert_eq!(config.client_id.as_deref(), Some("azerty"));
		assert_eq!(config.client_secret.as_ref().map(Secret::expose), Some("abc123"));
		assert_eq!(config.username.as_deref(), Some("john@mail.com"));
		assert!(config.password.is_none());

		config.merge(ConfigPatch::default().client_id("qwerty"));

		assert_eq!(config.client_id.as_deref(), Some("qwerty"));
		assert_eq!(config.token_uri, "/oauth/v2/token");
	}

	#[test]
	fn patch_deserializes_camel_case_keys() {
		let patch: ConfigPatch = serde_json::from_str(
			r#"{"tokenUri":"/oauth/v2/token","clientId":"azerty","clientSecret":"abc123","username":"john@mail.com","password":"123456","timeout":1500}"#,
		)
		.expect("Browser-style configuration should deserialize.");

		assert_eq!(patch.token_uri.as_deref(), Some("/oauth/v2/token"));
		assert_eq!(patch.client_id.as_deref(), Some("azerty"));
		assert_eq!(patch.password.as_ref().map(Secret::expose), Some("123456"));
		assert_eq!(patch.timeout, Some(StdDuration::from_millis(1500)));
		assert!(serde_json::from_str::<ConfigPatch>(r#"{"scope":"x"}"#).is_err());
	}

	#[test]
	fn relative_urls_need_a_base() {
		let config = ClientConfig::default();
		let err = config.resolve_url("/fetch").expect_err("Relative URL must need a base.");

		assert!(matches!(err, ConfigError::MissingBaseUrl { .. }));

		let config = config.with_base_url(
			Url::parse("http://127.0.0.1:8080/app/").expect("Base URL fixture should parse."),
		);

		assert_eq!(
			config.resolve_url("/fetch").expect("Relative URL should resolve.").as_str(),
			"http://127.0.0.1:8080/fetch"
		);
		assert_eq!(
			config
				.resolve_url("https://api.example.com/x")
				.expect("Absolute URL should pass through.")
				.as_str(),
			"https://api.example.com/x"
		);
	}

	#[test]
	fn debug_output_redacts_credentials() {
		let config = ClientConfig::default().with_user("john@mail.com", "123456");
		let rendered = format!("{config:?}");

		assert!(rendered.contains("john@mail.com"));
		assert!(!rendered.contains("123456"));
	}
}

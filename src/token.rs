//! Token model: redacted secrets, store keys, and the access/refresh pair.

// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping tokens and credentials out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Secret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Names of the two values a credential store persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKey {
	/// Short-lived bearer credential.
	AccessToken,
	/// Long-lived credential exchanged for a new access token.
	RefreshToken,
}
impl TokenKey {
	/// Returns the persisted name of the value.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKey::AccessToken => "access_token",
			TokenKey::RefreshToken => "refresh_token",
		}
	}
}
impl Display for TokenKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access/refresh token pair as held by a credential store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenPair {
	/// Bearer token attached to gated requests.
	pub access_token: Option<Secret>,
	/// Token exchanged during the refresh grant.
	pub refresh_token: Option<Secret>,
}
impl TokenPair {
	/// Builds a complete pair.
	pub fn new(access_token: impl Into<Secret>, refresh_token: impl Into<Secret>) -> Self {
		Self { access_token: Some(access_token.into()), refresh_token: Some(refresh_token.into()) }
	}

	/// Whether neither token is present.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}

	pub(crate) fn into_entries(self) -> [(TokenKey, Option<Secret>); 2] {
		[(TokenKey::AccessToken, self.access_token), (TokenKey::RefreshToken, self.refresh_token)]
	}
}

/// Token endpoint success body.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenResponse {
	pub(crate) access_token: String,
	pub(crate) refresh_token: String,
}
impl From<TokenResponse> for TokenPair {
	fn from(response: TokenResponse) -> Self {
		Self::new(response.access_token, response.refresh_token)
	}
}

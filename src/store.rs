//! Credential store contract and built-in implementations.
//!
//! A store persists exactly two named values, `access_token` and `refresh_token`. Reads never
//! fail (an unset value is `None`), writes are visible to the next read as soon as they return,
//! and removing an absent value is a no-op.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	token::{Secret, TokenKey, TokenPair},
};

/// Storage backend contract for the gate's token pair.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the stored value, or `None` when unset.
	fn get(&self, key: TokenKey) -> Option<Secret>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set(&self, key: TokenKey, value: Secret) -> Result<(), StoreError>;

	/// Clears `key`; clearing an unset key succeeds.
	fn remove(&self, key: TokenKey) -> Result<(), StoreError>;

	/// Replaces both values as one unit; an absent half is removed.
	///
	/// Either both halves are written or the previous pair stays in place. The provided
	/// implementation writes key by key and restores the previous pair when a write fails.
	/// Backends that can swap both values under one lock should override it.
	fn store_pair(&self, pair: TokenPair) -> Result<(), StoreError> {
		let previous = TokenPair {
			access_token: self.get(TokenKey::AccessToken),
			refresh_token: self.get(TokenKey::RefreshToken),
		};

		write_pair(self, pair).inspect_err(|_| {
			let _ = write_pair(self, previous);
		})
	}
}
impl dyn CredentialStore + '_ {
	/// Returns the stored access token.
	pub fn access_token(&self) -> Option<Secret> {
		self.get(TokenKey::AccessToken)
	}

	/// Returns the stored refresh token.
	pub fn refresh_token(&self) -> Option<Secret> {
		self.get(TokenKey::RefreshToken)
	}

	/// Stores the access token.
	pub fn set_access_token(&self, token: impl Into<Secret>) -> Result<(), StoreError> {
		self.set(TokenKey::AccessToken, token.into())
	}

	/// Stores the refresh token.
	pub fn set_refresh_token(&self, token: impl Into<Secret>) -> Result<(), StoreError> {
		self.set(TokenKey::RefreshToken, token.into())
	}

	/// Reads both values.
	pub fn token_pair(&self) -> TokenPair {
		TokenPair { access_token: self.access_token(), refresh_token: self.refresh_token() }
	}

	/// Removes both values.
	pub fn clear(&self) -> Result<(), StoreError> {
		self.remove(TokenKey::AccessToken)?;
		self.remove(TokenKey::RefreshToken)
	}
}

fn write_pair<S>(store: &S, pair: TokenPair) -> Result<(), StoreError>
where
	S: ?Sized + CredentialStore,
{
	for (key, value) in pair.into_entries() {
		match value {
			Some(secret) => store.set(key, secret)?,
			None => store.remove(key)?,
		}
	}

	Ok(())
}

/// Applies `pair` to an in-memory snapshot; an absent half is removed.
pub(crate) fn apply_pair(snapshot: &mut BTreeMap<TokenKey, Secret>, pair: TokenPair) {
	for (key, value) in pair.into_entries() {
		match value {
			Some(secret) => snapshot.insert(key, secret),
			None => snapshot.remove(&key),
		};
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

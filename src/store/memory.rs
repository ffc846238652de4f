//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{self, CredentialStore, StoreError},
	token::{Secret, TokenKey, TokenPair},
};

/// Storage backend that keeps the token pair in-process; clones share the same values.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<BTreeMap<TokenKey, Secret>>>);
impl CredentialStore for MemoryStore {
	fn get(&self, key: TokenKey) -> Option<Secret> {
		self.0.read().get(&key).cloned()
	}

	fn set(&self, key: TokenKey, value: Secret) -> Result<(), StoreError> {
		self.0.write().insert(key, value);

		Ok(())
	}

	fn remove(&self, key: TokenKey) -> Result<(), StoreError> {
		self.0.write().remove(&key);

		Ok(())
	}

	fn store_pair(&self, pair: TokenPair) -> Result<(), StoreError> {
		store::apply_pair(&mut self.0.write(), pair);

		Ok(())
	}
}

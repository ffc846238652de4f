//! The token-gated request client.
//!
//! [`TokenGate`] owns the transport, the credential store, and the shared configuration, so
//! the grant exchanges ([`TokenGate::authenticate`], [`TokenGate::refresh`]) and the request
//! state machine ([`TokenGate::request`]) only deal with their own transitions. Clones share
//! configuration, tokens, counters, and single-flight guards.

pub mod common;

mod authenticate;
mod metrics;
mod refresh;
mod request;

pub use common::GrantType;
pub use metrics::{ExchangeMetrics, GateMetrics};

// self
use crate::{
	_prelude::*,
	config::{ClientConfig, ConfigPatch},
	http::HttpTransport,
	store::CredentialStore,
	token::{Secret, TokenPair},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Gate specialized for the crate's default reqwest transport.
pub type ReqwestTokenGate = TokenGate<ReqwestTransport>;

/// Attaches bearer tokens to outgoing requests and keeps them fresh.
pub struct TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for grant exchanges and gated requests.
	pub transport: Arc<T>,
	/// Store that exclusively holds the token pair.
	pub store: Arc<dyn CredentialStore>,
	/// Exchange and retry counters.
	pub metrics: Arc<GateMetrics>,
	config: Arc<RwLock<ClientConfig>>,
	auth_guard: Arc<AsyncMutex<()>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<T> TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a gate that executes through the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		config: ClientConfig,
		transport: Arc<T>,
	) -> Self {
		Self {
			transport,
			store,
			metrics: Default::default(),
			config: Arc::new(RwLock::new(config)),
			auth_guard: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Returns a snapshot of the current configuration.
	pub fn config(&self) -> ClientConfig {
		self.config.read().clone()
	}

	/// Merges `patch` over the current configuration; later fields win.
	pub fn configure(&self, patch: ConfigPatch) {
		self.config.write().merge(patch);
	}

	/// Returns the stored access token.
	pub fn access_token(&self) -> Option<Secret> {
		self.store.access_token()
	}

	/// Stores an access token.
	pub fn set_access_token(&self, token: impl Into<Secret>) -> Result<()> {
		Ok(self.store.set_access_token(token)?)
	}

	/// Returns the stored refresh token.
	pub fn refresh_token(&self) -> Option<Secret> {
		self.store.refresh_token()
	}

	/// Stores a refresh token.
	pub fn set_refresh_token(&self, token: impl Into<Secret>) -> Result<()> {
		Ok(self.store.set_refresh_token(token)?)
	}

	/// Returns both stored tokens.
	pub fn tokens(&self) -> TokenPair {
		self.store.token_pair()
	}

	/// Forgets both tokens (logout). Clearing an empty store succeeds.
	pub fn clear_tokens(&self) -> Result<()> {
		Ok(self.store.clear()?)
	}

	fn single_flight(&self) -> bool {
		self.config.read().single_flight
	}
}
#[cfg(feature = "reqwest")]
impl TokenGate<ReqwestTransport> {
	/// Creates a gate backed by a fresh reqwest client.
	pub fn new(store: Arc<dyn CredentialStore>, config: ClientConfig) -> Self {
		Self::with_transport(store, config, Arc::new(ReqwestTransport::default()))
	}
}
impl<T> Clone for TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			store: Arc::clone(&self.store),
			metrics: Arc::clone(&self.metrics),
			config: Arc::clone(&self.config),
			auth_guard: Arc::clone(&self.auth_guard),
			refresh_guard: Arc::clone(&self.refresh_guard),
		}
	}
}
impl<T> Debug for TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGate")
			.field("config", &*self.config.read())
			.field("access_token_set", &self.store.access_token().is_some())
			.finish()
	}
}

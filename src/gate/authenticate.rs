//! Resource owner password grant.
//!
//! [`TokenGate::authenticate`] bootstraps the token pair from the configured client and user
//! credentials. The gate calls it whenever a gated request starts with no stored access token.

// self
use crate::{
	_prelude::*,
	gate::{
		TokenGate,
		common::{self, Grant},
	},
	http::{HttpTransport, Outcome},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<T> TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	/// Performs the `password` grant and stores the issued token pair.
	///
	/// Resolves with the token endpoint outcome on HTTP 200. Any other status rejects with that
	/// outcome and leaves the stored tokens untouched.
	pub async fn authenticate(&self) -> Result<Outcome> {
		const KIND: FlowKind = FlowKind::Authenticate;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.metrics.authenticate.record_attempt();

		let result = span.instrument(self.exchange_grant(Grant::Password)).await;

		common::record_exchange(KIND, &self.metrics.authenticate, &result);

		result
	}

	/// Authenticates before a gated request that found no access token.
	///
	/// With single-flight enabled, callers queue on one guard and only the first one that still
	/// sees an empty store performs the exchange.
	pub(crate) async fn authenticate_for_request(&self) -> Result<()> {
		if !self.single_flight() {
			return self.authenticate().await.map(|_| ());
		}

		let _singleflight = self.auth_guard.lock().await;

		if self.store.access_token().is_some() {
			return Ok(());
		}

		self.authenticate().await.map(|_| ())
	}
}

//! Refresh token grant.

// self
use crate::{
	_prelude::*,
	gate::{
		TokenGate,
		common::{self, Grant},
	},
	http::{HttpTransport, Outcome},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::Secret,
};

impl<T> TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	/// Performs the `refresh_token` grant with the stored refresh token and stores the rotated
	/// pair.
	///
	/// A missing refresh token is sent as `null`; the token endpoint decides. Non-200 responses
	/// reject with the exchange outcome and leave the stored tokens untouched.
	pub async fn refresh(&self) -> Result<Outcome> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.metrics.refresh.record_attempt();

		let grant = Grant::RefreshToken(self.store.refresh_token());
		let result = span.instrument(self.exchange_grant(grant)).await;

		common::record_exchange(KIND, &self.metrics.refresh, &result);

		result
	}

	/// Refreshes after `rejected` came back with HTTP 401.
	///
	/// With single-flight enabled, a caller that acquires the guard after another caller already
	/// replaced `rejected` reuses the new token instead of refreshing again.
	pub(crate) async fn refresh_for_request(&self, rejected: &Secret) -> Result<()> {
		if !self.single_flight() {
			return self.refresh().await.map(|_| ());
		}

		let _singleflight = self.refresh_guard.lock().await;

		if self.store.access_token().is_some_and(|current| &current != rejected) {
			return Ok(());
		}

		self.refresh().await.map(|_| ())
	}
}

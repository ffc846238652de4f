//! Gated request orchestration.
//!
//! [`TokenGate::request`] runs one pass of the state machine:
//!
//! - no access token: authenticate, then execute once;
//! - access token: execute; on HTTP 401 refresh once and execute once more.
//!
//! A call never refreshes twice and never recurses. Failures surface unchanged: an
//! authentication failure, a refresh failure (instead of the 401 that triggered it), the
//! outcome of the single retry, or any non-401 failure of the first execution.

// self
use crate::{
	_prelude::*,
	gate::{TokenGate, common},
	http::{HttpTransport, Outcome, Request},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::Secret,
};

impl<T> TokenGate<T>
where
	T: ?Sized + HttpTransport,
{
	/// Executes `request` with a bearer token, authenticating or refreshing as needed.
	pub async fn request(&self, request: Request) -> Result<Outcome> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.run_request(&request, &span)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Executes `request` with the stored access token attached as `Authorization: Bearer`.
	///
	/// The caller's descriptor is not modified. When no token is stored the request is sent
	/// without the header.
	pub async fn execute_query(&self, request: &Request) -> Result<Outcome> {
		let token = self.store.access_token();

		self.execute_with(request, token.as_ref()).await
	}

	/// Executes `request` as given, without any token handling.
	///
	/// Resolves for any 2xx status and rejects with [`Error::Status`] otherwise.
	pub async fn fetch(&self, request: &Request) -> Result<Outcome> {
		let http_request = {
			let config = self.config.read();

			common::http_request(&config, request)?
		};
		let outcome = self.transport.execute(http_request).await?;

		if outcome.is_success() { Ok(outcome) } else { Err(outcome.into()) }
	}

	async fn run_request(&self, request: &Request, span: &FlowSpan) -> Result<Outcome> {
		let Some(token) = self.store.access_token() else {
			span.transition("authenticating", None);
			self.authenticate_for_request().await?;
			span.transition("executing", None);

			return self.execute_query(request).await;
		};

		span.transition("executing", None);

		match self.execute_with(request, Some(&token)).await {
			Err(err) if err.is_unauthorized() => {
				span.transition("refreshing", err.status());
				self.refresh_for_request(&token).await?;
				span.transition("retrying", None);
				obs::record_flow_outcome(FlowKind::Request, FlowOutcome::Retry);
				self.metrics.record_retry();

				self.execute_query(request).await
			},
			other => other,
		}
	}

	async fn execute_with(&self, request: &Request, token: Option<&Secret>) -> Result<Outcome> {
		match token {
			Some(token) => self.fetch(&request.with_bearer(token.expose())).await,
			None => self.fetch(request).await,
		}
	}
}

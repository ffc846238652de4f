// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by gate flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_gate.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Emits a debug event marking a state transition inside the span.
	pub fn transition(&self, state: &'static str, status: Option<u16>) {
		#[cfg(feature = "tracing")]
		{
			let _entered = self.span.enter();

			tracing::debug!(state, status, "gate transition");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (state, status);
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn transitions_are_noops_without_subscribers() {
		FlowSpan::new(FlowKind::Request, "test").transition("refreshing", Some(401));
	}

	#[cfg(feature = "tracing")]
	#[test]
	fn flow_span_carries_flow_fields() {
		let span = FlowSpan::new(FlowKind::Authenticate, "flow_span_carries_flow_fields");

		span.transition("authenticating", None);
		span.transition("refreshing", Some(401));

		let metadata = span.span.metadata().expect("Flow spans should carry metadata.");

		assert_eq!(metadata.name(), "oauth2_gate.flow");
		assert!(metadata.fields().field("flow").is_some());
		assert!(metadata.fields().field("stage").is_some());
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}

// self
use crate::{_prelude::*, obs::FlowKind, outcome::TerminalState};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by relay flows.
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
			let span = tracing::info_span!("session_relay.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
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

/// Emits one event describing how a forward invocation ended.
///
/// Fallback failures log at error level so they stand apart from ordinary upstream errors.
pub fn log_terminal(state: TerminalState, status: StatusCode) {
	#[cfg(feature = "tracing")]
	{
		use crate::outcome::OutcomeClass;

		let state_label = state.as_str();
		let status = status.as_u16();

		match (state, state.class()) {
			(TerminalState::FallbackFailed, _) =>
				tracing::error!(state = state_label, status, "Anonymous fallback failed."),
			(_, OutcomeClass::UpstreamError) =>
				tracing::warn!(state = state_label, status, "Forward ended with a failure."),
			_ => tracing::info!(state = state_label, status, "Forward completed."),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (state, status);
	}
}

/// Emits a warning for a failed session call (refresh or logout).
pub fn log_session_failure(kind: FlowKind, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(flow = kind.as_str(), error_kind = error.kind(), %error, "Session call failed.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

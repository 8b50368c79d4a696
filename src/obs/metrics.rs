// self
use crate::{
	obs::{FlowKind, FlowOutcome},
	outcome::TerminalState,
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"session_relay_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the terminal state of a forward invocation (when enabled).
pub fn record_terminal(state: TerminalState) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("session_relay_terminal_total", "state" => state.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = state;
	}
}

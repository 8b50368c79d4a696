//! Logout client: best-effort session invalidation.

// self
use crate::{
	_prelude::*,
	auth::{InstructionSet, TokenSecret},
	flows::Relay,
	http::BackendHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C> Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Asks the backend to invalidate the session and returns the `Set-Cookie` instructions it
	/// issued.
	///
	/// Never fails: transport errors and non-success statuses are logged and yield an empty set.
	pub async fn logout(&self, refresh: Option<&TokenSecret>) -> InstructionSet {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.metrics.record_logout_call();

		match span.instrument(self.invalidate_session(refresh)).await {
			Ok(instructions) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				instructions
			},
			Err(e) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_session_failure(KIND, &e);

				InstructionSet::new()
			},
		}
	}

	async fn invalidate_session(&self, refresh: Option<&TokenSecret>) -> Result<InstructionSet> {
		let cookie = refresh.map(|secret| (self.descriptor.cookies.refresh.as_str(), secret));
		let response = self.post_session(&self.descriptor.endpoints.logout, cookie).await?;

		if !response.status.is_success() {
			return Err(Error::LogoutRejected { status: response.status.as_u16() });
		}

		Ok(InstructionSet::from_headers(&response.headers))
	}
}

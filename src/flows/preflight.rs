//! Pre-flight renewer: refreshes early when only the refresh credential is left.

// self
use crate::{
	auth::{CredentialPair, InstructionSet},
	flows::Relay,
	http::BackendHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Result of a pre-flight check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preflight {
	/// Pair to use for the request that follows.
	pub credentials: CredentialPair,
	/// Set-instructions to attach to that request's response.
	pub instructions: InstructionSet,
	/// `true` when a refresh succeeded.
	pub renewed: bool,
}
impl Preflight {
	fn unchanged(credentials: &CredentialPair) -> Self {
		Self { credentials: credentials.clone(), instructions: InstructionSet::new(), renewed: false }
	}
}

impl<C> Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Renews the access credential when it is absent but a refresh credential is present.
	///
	/// At most one refresh is attempted, bounded by the descriptor's overall timeout. On failure
	/// or timeout, or when the precondition does not hold, the pair is returned unchanged; this
	/// never logs the caller out.
	pub async fn preflight(&self, credentials: &CredentialPair) -> Preflight {
		const KIND: FlowKind = FlowKind::Preflight;

		if !credentials.needs_preflight() {
			return Preflight::unchanged(credentials);
		}

		let span = FlowSpan::new(KIND, "preflight");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let renewal = span.instrument(self.refresh(credentials.refresh.as_ref()));
		let result = match self.descriptor.overall_timeout {
			Some(limit) => tokio::time::timeout(limit, renewal).await.ok(),
			None => Some(renewal.await),
		};

		match result {
			Some(Ok(grant)) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				Preflight {
					credentials: grant.apply(credentials),
					instructions: grant.instructions,
					renewed: true,
				}
			},
			Some(Err(_)) | None => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				Preflight::unchanged(credentials)
			},
		}
	}
}

//! Forwarding proxy: authenticated attempt, one refresh, one retry, anonymous fallback.
//!
//! [`Relay::forward`] never fails. Every path through the state machine ends in an
//! [`Outcome`] whose [`TerminalState`] records which branch produced it:
//!
//! 1. Call the backend with the inbound credentials. Success, not-found, and unrelated failures
//!    end here.
//! 2. On an authentication failure, run the refresh client once.
//! 3. If it issued a new access credential, retry with it and return the retry's result along
//!    with the set-instructions.
//! 4. Otherwise log out, call the backend without any `Cookie` header, and return that result
//!    along with the clearing instructions.

// self
use crate::{
	auth::InstructionSet,
	backend::Verdict,
	flows::{RefreshGrant, Relay, RequestContext},
	http::{BackendHttpClient, BackendResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	outcome::{Outcome, OutcomeClass, TerminalState},
};

const UPSTREAM_FAILURE: &str = "Internal Server Error";
const FALLBACK_FAILURE: &str = "Failed to fetch public data.";
const TIMEOUT_FAILURE: &str = "Request timed out.";

impl<C> Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Forwards `ctx` to `backend_path` (relative to the descriptor's base URL).
	///
	/// Issues at most one refresh call, one logout call, and three resource calls. When the
	/// descriptor sets an overall timeout and it expires, the outcome is
	/// [`TerminalState::TimedOut`] with no instructions.
	pub async fn forward(&self, ctx: &RequestContext, backend_path: &str) -> Outcome {
		const KIND: FlowKind = FlowKind::Forward;

		let span = FlowSpan::new(KIND, "forward");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let run = span.instrument(self.attempt(ctx, backend_path));
		let outcome = match self.descriptor.overall_timeout {
			Some(limit) => tokio::time::timeout(limit, run)
				.await
				.unwrap_or_else(|_| Outcome::failure(TerminalState::TimedOut, TIMEOUT_FAILURE)),
			None => run.await,
		};
		let flow_outcome = match outcome.class() {
			OutcomeClass::UpstreamError => FlowOutcome::Failure,
			OutcomeClass::Success | OutcomeClass::NotFound => FlowOutcome::Success,
		};

		obs::record_flow_outcome(KIND, flow_outcome);
		obs::record_terminal(outcome.terminal);
		obs::log_terminal(outcome.terminal, outcome.status);

		outcome
	}

	async fn attempt(&self, ctx: &RequestContext, backend_path: &str) -> Outcome {
		let response = match self.call_resource(ctx, backend_path, Some(&ctx.cookies)).await {
			Ok(response) => response,
			Err(_) => return Outcome::failure(TerminalState::UpstreamError, UPSTREAM_FAILURE),
		};

		match self.classify(&response) {
			Verdict::Success => served(TerminalState::Success, response),
			Verdict::NotFound => Outcome::not_found(TerminalState::NotFound),
			Verdict::Failure => Outcome::failure(TerminalState::UpstreamError, UPSTREAM_FAILURE),
			Verdict::AuthFailed => match self.refresh(ctx.credentials().refresh.as_ref()).await {
				Ok(grant) => self.retry(ctx, backend_path, grant).await,
				Err(_) => self.fallback(ctx, backend_path).await,
			},
		}
	}

	async fn retry(
		&self,
		ctx: &RequestContext,
		backend_path: &str,
		grant: RefreshGrant,
	) -> Outcome {
		let cookies = ctx.cookies.with_credentials(grant.apply(ctx.credentials()));
		let mut instructions = grant.instructions;
		let outcome = match self.call_resource(ctx, backend_path, Some(&cookies)).await {
			Ok(response) => match self.classify(&response) {
				Verdict::Success => {
					let outcome = served(TerminalState::SuccessAfterRefresh, response);

					instructions.merge(outcome.instructions.clone());

					outcome
				},
				Verdict::NotFound => Outcome::not_found(TerminalState::NotFoundAfterRefresh),
				Verdict::AuthFailed | Verdict::Failure =>
					Outcome::failure(TerminalState::RetryFailed, UPSTREAM_FAILURE),
			},
			Err(_) => Outcome::failure(TerminalState::RetryFailed, UPSTREAM_FAILURE),
		};

		outcome.with_instructions(instructions)
	}

	async fn fallback(&self, ctx: &RequestContext, backend_path: &str) -> Outcome {
		let mut clearing = self.logout(ctx.credentials().refresh.as_ref()).await;

		if self.descriptor.synthesize_clears {
			let names = &self.descriptor.cookies;

			clearing.ensure_cleared(
				[names.access.as_str(), names.refresh.as_str()],
				&self.descriptor.cookie_attributes,
			);
		}

		let outcome = match self.call_resource(ctx, backend_path, None).await {
			Ok(response) => match self.classify(&response) {
				Verdict::Success => served(TerminalState::SuccessAnonymous, response),
				Verdict::NotFound => Outcome::not_found(TerminalState::NotFoundAnonymous),
				Verdict::AuthFailed | Verdict::Failure =>
					Outcome::failure(TerminalState::FallbackFailed, FALLBACK_FAILURE),
			},
			Err(_) => Outcome::failure(TerminalState::FallbackFailed, FALLBACK_FAILURE),
		};
		let mut instructions = outcome.instructions.clone();

		instructions.merge(clearing);

		outcome.with_instructions(instructions)
	}
}

/// Builds a passthrough outcome carrying the backend's own `Set-Cookie` instructions.
fn served(terminal: TerminalState, response: BackendResponse) -> Outcome {
	let instructions = InstructionSet::from_headers(&response.headers);

	Outcome::passthrough(terminal, response.status, response.body).with_instructions(instructions)
}

//! Refresh client: exchanges the refresh credential for a new access credential.
//!
//! [`Relay::refresh`] performs exactly one POST to the refresh endpoint. Any failure (no
//! credential, transport error, non-success status, missing or cleared access cookie) is
//! reported as an [`Error`]; callers treat them all alike.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, CredentialPair, InstructionSet, TokenSecret},
	flows::Relay,
	http::BackendHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Credentials issued by a successful refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshGrant {
	/// New access credential.
	pub access: TokenSecret,
	/// Replacement refresh credential, when the backend rotated it.
	pub rotated_refresh: Option<TokenSecret>,
	/// Set-instructions for the caller, covering the access cookie and any rotated refresh
	/// cookie, with the backend's attributes.
	pub instructions: InstructionSet,
}
impl RefreshGrant {
	/// Returns `pair` with the renewed credentials applied.
	pub fn apply(&self, pair: &CredentialPair) -> CredentialPair {
		let mut renewed = pair.clone().with_access(self.access.clone());

		if let Some(refresh) = &self.rotated_refresh {
			renewed = renewed.with_refresh(refresh.clone());
		}

		renewed
	}
}

impl<C> Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Exchanges `refresh` for a new access credential.
	///
	/// An absent credential fails locally without contacting the backend.
	pub async fn refresh(&self, refresh: Option<&TokenSecret>) -> Result<RefreshGrant> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.metrics.record_refresh_attempt();

		let result = span.instrument(self.exchange_refresh(refresh)).await;

		match &result {
			Ok(_) => {
				self.metrics.record_refresh_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(e) => {
				self.metrics.record_refresh_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::log_session_failure(KIND, e);
			},
		}

		result
	}

	async fn exchange_refresh(&self, refresh: Option<&TokenSecret>) -> Result<RefreshGrant> {
		let refresh = refresh.ok_or(Error::MissingRefreshCredential)?;
		let names = &self.descriptor.cookies;
		let response = self
			.post_session(&self.descriptor.endpoints.refresh, Some((names.refresh.as_str(), refresh)))
			.await?;

		if !response.status.is_success() {
			return Err(Error::RefreshRejected { status: response.status.as_u16() });
		}

		// Only credential cookies that carry a value are relevant; anything else the refresh
		// endpoint emits stays with the backend.
		let instructions = InstructionSet::from_headers(&response.headers)
			.into_iter()
			.filter(|instruction| {
				names.kind_of(&instruction.name).is_some() && !instruction.is_clear()
			})
			.collect::<InstructionSet>();
		let access = instructions
			.get(names.name_of(CredentialKind::Access))
			.and_then(|instruction| instruction.value())
			.cloned()
			.ok_or(Error::MissingAccessCredential)?;
		let rotated_refresh = instructions
			.get(names.name_of(CredentialKind::Refresh))
			.and_then(|instruction| instruction.value())
			.cloned();

		Ok(RefreshGrant { access, rotated_refresh, instructions })
	}
}

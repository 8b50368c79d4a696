//! Terminal states and the normalized result of one forward invocation.

// self
use crate::{_prelude::*, auth::InstructionSet};

/// Exhaustive set of ways a forward invocation can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
	/// First attempt succeeded.
	Success,
	/// First attempt reported the resource absent.
	NotFound,
	/// First attempt failed for a reason unrelated to authentication.
	UpstreamError,
	/// Retry with a renewed access credential succeeded.
	SuccessAfterRefresh,
	/// Retry with a renewed access credential reported the resource absent.
	NotFoundAfterRefresh,
	/// Retry with a renewed access credential failed.
	RetryFailed,
	/// Anonymous fallback succeeded.
	SuccessAnonymous,
	/// Anonymous fallback reported the resource absent.
	NotFoundAnonymous,
	/// Anonymous fallback failed.
	FallbackFailed,
	/// The overall deadline expired.
	TimedOut,
}
impl TerminalState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::NotFound => "not_found",
			Self::UpstreamError => "upstream_error",
			Self::SuccessAfterRefresh => "success_after_refresh",
			Self::NotFoundAfterRefresh => "not_found_after_refresh",
			Self::RetryFailed => "retry_failed",
			Self::SuccessAnonymous => "success_anonymous",
			Self::NotFoundAnonymous => "not_found_anonymous",
			Self::FallbackFailed => "fallback_failed",
			Self::TimedOut => "timed_out",
		}
	}

	/// Collapses the state into the class visible to the caller.
	pub const fn class(self) -> OutcomeClass {
		match self {
			Self::Success | Self::SuccessAfterRefresh | Self::SuccessAnonymous =>
				OutcomeClass::Success,
			Self::NotFound | Self::NotFoundAfterRefresh | Self::NotFoundAnonymous =>
				OutcomeClass::NotFound,
			Self::UpstreamError | Self::RetryFailed | Self::FallbackFailed | Self::TimedOut =>
				OutcomeClass::UpstreamError,
		}
	}
}
impl Display for TerminalState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-visible outcome class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
	/// The resource was served.
	Success,
	/// The resource does not exist.
	NotFound,
	/// Generic failure.
	UpstreamError,
}

/// Failure raised when an outcome body cannot be decoded.
#[derive(Debug, ThisError)]
#[error("Outcome body could not be decoded at `{path}`.")]
pub struct OutcomeBodyError {
	/// JSON path of the failing field.
	pub path: String,
	/// Underlying decoder failure.
	#[source]
	pub source: serde_json::Error,
}

/// Normalized result returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
	/// How the invocation ended.
	pub terminal: TerminalState,
	/// Status to send to the caller.
	pub status: StatusCode,
	/// JSON body to send to the caller.
	pub body: Vec<u8>,
	/// Credential-state instructions to emit as `Set-Cookie` headers.
	pub instructions: InstructionSet,
}
impl Outcome {
	pub(crate) const NOT_FOUND_DETAIL: &'static str = "Not found";

	pub(crate) fn passthrough(terminal: TerminalState, status: StatusCode, body: Vec<u8>) -> Self {
		Self { terminal, status, body, instructions: InstructionSet::new() }
	}

	pub(crate) fn not_found(terminal: TerminalState) -> Self {
		let body = serde_json::json!({ "detail": Self::NOT_FOUND_DETAIL });

		Self::passthrough(terminal, StatusCode::NOT_FOUND, body.to_string().into_bytes())
	}

	pub(crate) fn failure(terminal: TerminalState, message: impl Display) -> Self {
		let body = serde_json::json!({ "error": message.to_string() });

		Self::passthrough(terminal, StatusCode::INTERNAL_SERVER_ERROR, body.to_string().into_bytes())
	}

	pub(crate) fn with_instructions(mut self, instructions: InstructionSet) -> Self {
		self.instructions = instructions;

		self
	}

	/// Returns the caller-visible class.
	pub fn class(&self) -> OutcomeClass {
		self.terminal.class()
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T, OutcomeBodyError>
	where
		T: for<'de> Deserialize<'de>,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| OutcomeBodyError {
			path: e.path().to_string(),
			source: e.into_inner(),
		})
	}
}

//! Backend strategy hooks that classify resource responses.
//!
//! The forwarding proxy only needs to know whether a response succeeded, reported an absent
//! resource, rejected the caller's credentials, or failed for an unrelated reason. Strategies
//! make that decision without tying flows to any particular HTTP client.

// self
use crate::_prelude::*;

/// Strategy hook that maps backend responses into a [`Verdict`].
///
/// Implementors are required to be `Send + Sync` and only see crate-owned data, so backends
/// that signal expiry differently (for example a 403 with a marker body) can be supported
/// without touching the flows.
pub trait BackendStrategy: Send + Sync {
	/// Classifies a response from a resource call.
	fn classify(&self, ctx: &ResponseContext) -> Verdict;
}

/// Canonical response categories used by the forwarding proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
	/// The backend served the resource.
	Success,
	/// The resource does not exist.
	NotFound,
	/// The access credential is expired or invalid.
	AuthFailed,
	/// Any other failure.
	Failure,
}

/// Context passed to backend strategies.
///
/// Only primitive data is kept so strategies stay decoupled from the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseContext {
	/// HTTP status code returned by the backend.
	pub status: u16,
	/// Preview of the response body.
	pub body_preview: Option<String>,
}
impl ResponseContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a context for the given status.
	pub fn new(status: u16) -> Self {
		Self { status, body_preview: None }
	}

	/// Adds a body preview, truncated to a bounded length.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy: 2xx succeeds, 401 means the credential failed, 404 means not found.
#[derive(Debug, Default)]
pub struct DefaultBackendStrategy;
impl Display for DefaultBackendStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-backend-strategy")
	}
}
impl BackendStrategy for DefaultBackendStrategy {
	fn classify(&self, ctx: &ResponseContext) -> Verdict {
		match ctx.status {
			200..=299 => Verdict::Success,
			401 => Verdict::AuthFailed,
			404 => Verdict::NotFound,
			_ => Verdict::Failure,
		}
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ResponseContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(ResponseContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_strategy_follows_the_status_contract() {
		let strategy = DefaultBackendStrategy;
		let verdict = |status| strategy.classify(&ResponseContext::new(status));

		assert_eq!(verdict(200), Verdict::Success);
		assert_eq!(verdict(204), Verdict::Success);
		assert_eq!(verdict(401), Verdict::AuthFailed);
		assert_eq!(verdict(404), Verdict::NotFound);
		assert_eq!(verdict(403), Verdict::Failure);
		assert_eq!(verdict(302), Verdict::Failure);
		assert_eq!(verdict(503), Verdict::Failure);
	}

	#[test]
	fn body_preview_is_truncated() {
		let ctx = ResponseContext::new(500).with_body_preview("x".repeat(300));
		let preview = ctx.body_preview.expect("Preview should be stored.");

		assert_eq!(preview.chars().count(), ResponseContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}

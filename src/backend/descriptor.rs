//! Backend descriptor data structures shared by all flows.

/// Builder API for assembling backend descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{
	_prelude::*,
	auth::{CookieAttributes, CookieNames},
};

/// Session endpoints resolved against the base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndpoints {
	/// Endpoint exchanging a refresh credential for a new access credential.
	pub refresh: Url,
	/// Endpoint invalidating the session.
	pub logout: Url,
}

/// Immutable backend descriptor consumed by the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
	/// Root every proxied path is resolved against.
	pub base_url: Url,
	/// Refresh and logout endpoints.
	pub endpoints: SessionEndpoints,
	/// Cookie names carrying the credentials.
	pub cookies: CookieNames,
	/// Attributes for cookies the relay issues itself.
	pub cookie_attributes: CookieAttributes,
	/// Per-call timeout applied by the transport.
	pub request_timeout: Option<Duration>,
	/// Deadline bounding one whole forward invocation.
	pub overall_timeout: Option<Duration>,
	/// Adds local clears for credentials the logout response left in place.
	pub synthesize_clears: bool,
}
impl BackendDescriptor {
	/// Creates a new builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> BackendDescriptorBuilder {
		BackendDescriptorBuilder::new(base_url)
	}

	/// Resolves a backend-relative resource path and query into an absolute URL.
	///
	/// The path is appended to the base URL's path verbatim, so a base of
	/// `https://api.example.com/v1` and a path of `posts/7/` yield
	/// `https://api.example.com/v1/posts/7/`.
	pub fn resource_url(
		&self,
		path: &str,
		query: &[(String, String)],
	) -> Result<Url, BackendDescriptorError> {
		let mut url = join_path(&self.base_url, path)?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}
}

pub(crate) fn join_path(base: &Url, path: &str) -> Result<Url, BackendDescriptorError> {
	if base.cannot_be_a_base() {
		return Err(BackendDescriptorError::CannotBeABase { url: base.to_string() });
	}

	let mut url = base.clone();
	let joined = format!("{}/{}", base.path().trim_end_matches('/'), path.trim_start_matches('/'));

	url.set_path(&joined);
	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

// self
use crate::{
	_prelude::*,
	auth::{CookieAttributes, CookieNames},
	backend::{BackendDescriptor, SessionEndpoints, descriptor::join_path},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum BackendDescriptorError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL must not carry a query or fragment.
	#[error("The base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasQuery {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot have paths appended to it.
	#[error("The base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Session endpoint paths must live under the base URL.
	#[error("The {endpoint} endpoint path must start with '/' and carry no query: {path}.")]
	InvalidEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Cookie names must be non-empty RFC 6265 tokens.
	#[error("Cookie name is not a valid token: {name:?}.")]
	InvalidCookieName {
		/// Name that failed validation.
		name: String,
	},
	/// Access and refresh cookies must use different names.
	#[error("Access and refresh cookies share the name {name:?}.")]
	DuplicateCookieName {
		/// Name used twice.
		name: String,
	},
	/// Timeouts must be positive.
	#[error("The {timeout} timeout must be greater than zero.")]
	ZeroTimeout {
		/// Which timeout failed validation.
		timeout: &'static str,
	},
}

/// Builder for [`BackendDescriptor`] values.
#[derive(Debug)]
pub struct BackendDescriptorBuilder {
	/// Root every proxied path is resolved against.
	pub base_url: Url,
	/// Refresh endpoint path, relative to the base URL.
	pub refresh_path: String,
	/// Logout endpoint path, relative to the base URL.
	pub logout_path: String,
	/// Credential cookie names.
	pub cookies: CookieNames,
	/// Attributes for relay-issued cookies.
	pub cookie_attributes: CookieAttributes,
	/// Per-call transport timeout.
	pub request_timeout: Option<Duration>,
	/// Deadline for one forward invocation.
	pub overall_timeout: Option<Duration>,
	/// Whether to synthesize clears after logout.
	pub synthesize_clears: bool,
}
impl BackendDescriptorBuilder {
	/// Default refresh endpoint path.
	pub const REFRESH_PATH: &'static str = "/users/refresh/";
	/// Default logout endpoint path.
	pub const LOGOUT_PATH: &'static str = "/users/logout/";
	/// Default per-call transport timeout.
	pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

	/// Creates a new builder rooted at `base_url`.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: Self::REFRESH_PATH.into(),
			logout_path: Self::LOGOUT_PATH.into(),
			cookies: CookieNames::default(),
			cookie_attributes: CookieAttributes::default(),
			request_timeout: Some(Self::REQUEST_TIMEOUT),
			overall_timeout: None,
			synthesize_clears: true,
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the logout endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();

		self
	}

	/// Overrides the credential cookie names.
	pub fn cookies(mut self, cookies: CookieNames) -> Self {
		self.cookies = cookies;

		self
	}

	/// Overrides the attributes of relay-issued cookies.
	pub fn cookie_attributes(mut self, attributes: CookieAttributes) -> Self {
		self.cookie_attributes = attributes;

		self
	}

	/// Sets the per-call transport timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Removes the per-call transport timeout.
	///
	/// Without it, only the overall deadline bounds a stalled backend call.
	pub fn without_request_timeout(mut self) -> Self {
		self.request_timeout = None;

		self
	}

	/// Sets the deadline for one forward invocation.
	pub fn overall_timeout(mut self, timeout: Duration) -> Self {
		self.overall_timeout = Some(timeout);

		self
	}

	/// Enables or disables clear synthesis after logout.
	pub fn synthesize_clears(mut self, enabled: bool) -> Self {
		self.synthesize_clears = enabled;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<BackendDescriptor, BackendDescriptorError> {
		validate_base_url(&self.base_url)?;
		validate_endpoint_path("refresh", &self.refresh_path)?;
		validate_endpoint_path("logout", &self.logout_path)?;

		let endpoints = SessionEndpoints {
			refresh: join_path(&self.base_url, &self.refresh_path)?,
			logout: join_path(&self.base_url, &self.logout_path)?,
		};
		let descriptor = BackendDescriptor {
			base_url: self.base_url,
			endpoints,
			cookies: self.cookies,
			cookie_attributes: self.cookie_attributes,
			request_timeout: self.request_timeout,
			overall_timeout: self.overall_timeout,
			synthesize_clears: self.synthesize_clears,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl BackendDescriptor {
	/// Validates invariants for the descriptor.
	///
	/// Descriptors deserialized from configuration bypass the builder, so call this before use.
	pub fn validate(&self) -> Result<(), BackendDescriptorError> {
		validate_base_url(&self.base_url)?;
		validate_cookie_name(&self.cookies.access)?;
		validate_cookie_name(&self.cookies.refresh)?;

		if self.cookies.access == self.cookies.refresh {
			return Err(BackendDescriptorError::DuplicateCookieName {
				name: self.cookies.access.clone(),
			});
		}

		validate_timeout("request", self.request_timeout)?;
		validate_timeout("overall", self.overall_timeout)?;

		Ok(())
	}
}

fn validate_base_url(url: &Url) -> Result<(), BackendDescriptorError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(BackendDescriptorError::UnsupportedScheme { url: url.to_string() });
	}
	if url.cannot_be_a_base() {
		return Err(BackendDescriptorError::CannotBeABase { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(BackendDescriptorError::BaseUrlHasQuery { url: url.to_string() });
	}

	Ok(())
}

fn validate_endpoint_path(name: &'static str, path: &str) -> Result<(), BackendDescriptorError> {
	if path.starts_with('/') && !path.contains(['?', '#']) {
		Ok(())
	} else {
		Err(BackendDescriptorError::InvalidEndpointPath { endpoint: name, path: path.to_owned() })
	}
}

fn validate_cookie_name(name: &str) -> Result<(), BackendDescriptorError> {
	// RFC 6265 `token`: visible ASCII minus separators.
	let valid = !name.is_empty()
		&& name.bytes().all(|b| {
			b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
		});

	if valid {
		Ok(())
	} else {
		Err(BackendDescriptorError::InvalidCookieName { name: name.to_owned() })
	}
}

fn validate_timeout(
	name: &'static str,
	timeout: Option<Duration>,
) -> Result<(), BackendDescriptorError> {
	if timeout.is_some_and(|timeout| timeout.is_zero()) {
		Err(BackendDescriptorError::ZeroTimeout { timeout: name })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.example.com/v1/").expect("Base URL fixture should parse.")
	}

	#[test]
	fn build_resolves_session_endpoints_under_the_base_path() {
		let descriptor =
			BackendDescriptor::builder(base()).build().expect("Default descriptor should build.");

		assert_eq!(descriptor.endpoints.refresh.as_str(), "https://api.example.com/v1/users/refresh/");
		assert_eq!(descriptor.endpoints.logout.as_str(), "https://api.example.com/v1/users/logout/");
		assert!(descriptor.synthesize_clears);
		assert_eq!(descriptor.request_timeout, Some(Duration::from_secs(10)));
		assert_eq!(descriptor.overall_timeout, None);

		let unbounded = BackendDescriptor::builder(base())
			.without_request_timeout()
			.build()
			.expect("Descriptor without a per-call timeout should build.");

		assert_eq!(unbounded.request_timeout, None);
	}

	#[test]
	fn resource_url_keeps_query_order() {
		let descriptor =
			BackendDescriptor::builder(base()).build().expect("Default descriptor should build.");
		let url = descriptor
			.resource_url("posts/7/", &[("page".into(), "2".into()), ("q".into(), "a b".into())])
			.expect("Resource URL should resolve.");

		assert_eq!(url.as_str(), "https://api.example.com/v1/posts/7/?page=2&q=a+b");
	}

	#[test]
	fn build_rejects_invalid_configuration() {
		let ftp = Url::parse("ftp://api.example.com").expect("FTP fixture should parse.");

		assert!(matches!(
			BackendDescriptor::builder(ftp).build(),
			Err(BackendDescriptorError::UnsupportedScheme { .. })
		));
		assert_eq!(
			BackendDescriptor::builder(base()).refresh_path("users/refresh").build(),
			Err(BackendDescriptorError::InvalidEndpointPath {
				endpoint: "refresh",
				path: "users/refresh".into(),
			})
		);
		assert_eq!(
			BackendDescriptor::builder(base()).cookies(CookieNames::new("sid", "sid")).build(),
			Err(BackendDescriptorError::DuplicateCookieName { name: "sid".into() })
		);
		assert_eq!(
			BackendDescriptor::builder(base()).cookies(CookieNames::new("a b", "r")).build(),
			Err(BackendDescriptorError::InvalidCookieName { name: "a b".into() })
		);
		assert_eq!(
			BackendDescriptor::builder(base()).overall_timeout(Duration::ZERO).build(),
			Err(BackendDescriptorError::ZeroTimeout { timeout: "overall" })
		);
	}
}

//! Inbound credential pair and the `Cookie` header it travels in.
//!
//! Requests carry two independent credentials as cookies. [`InboundCookies`] parses the raw
//! header once into a structured [`CredentialPair`] plus the unrelated cookies that must keep
//! flowing to the backend, and renders the header again from those parts. Replacing the access
//! credential is a field update, never a string splice.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Cookie names carrying the two credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieNames {
	/// Cookie carrying the short-lived access credential.
	pub access: String,
	/// Cookie carrying the long-lived refresh credential.
	pub refresh: String,
}
impl CookieNames {
	/// Default name of the access cookie.
	pub const ACCESS: &'static str = "access_token";
	/// Default name of the refresh cookie.
	pub const REFRESH: &'static str = "refresh_token";

	/// Creates a custom name pair.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: access.into(), refresh: refresh.into() }
	}

	/// Classifies a cookie name, returning `None` for cookies that carry no credential.
	pub fn kind_of(&self, name: &str) -> Option<CredentialKind> {
		if name == self.access {
			Some(CredentialKind::Access)
		} else if name == self.refresh {
			Some(CredentialKind::Refresh)
		} else {
			None
		}
	}

	/// Returns the cookie name used for the given credential.
	pub fn name_of(&self, kind: CredentialKind) -> &str {
		match kind {
			CredentialKind::Access => &self.access,
			CredentialKind::Refresh => &self.refresh,
		}
	}
}
impl Default for CookieNames {
	fn default() -> Self {
		Self::new(Self::ACCESS, Self::REFRESH)
	}
}

/// The two credential roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKind {
	/// Short-lived bearer token authorizing API calls.
	Access,
	/// Long-lived bearer token used only to obtain new access tokens.
	Refresh,
}
impl CredentialKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialKind::Access => "access",
			CredentialKind::Refresh => "refresh",
		}
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access and refresh credentials carried by one inbound request.
///
/// Either side may be absent independently. A pair with neither credential is anonymous.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialPair {
	/// Access credential, if the caller sent one.
	pub access: Option<TokenSecret>,
	/// Refresh credential, if the caller sent one.
	pub refresh: Option<TokenSecret>,
}
impl CredentialPair {
	/// Creates a pair from optional credentials.
	pub fn new(access: Option<TokenSecret>, refresh: Option<TokenSecret>) -> Self {
		Self { access, refresh }
	}

	/// Creates a pair without any credentials.
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// Returns `true` when neither credential is present.
	pub fn is_anonymous(&self) -> bool {
		self.access.is_none() && self.refresh.is_none()
	}

	/// Replaces the access credential.
	pub fn with_access(mut self, access: TokenSecret) -> Self {
		self.access = Some(access);

		self
	}

	/// Replaces the refresh credential.
	pub fn with_refresh(mut self, refresh: TokenSecret) -> Self {
		self.refresh = Some(refresh);

		self
	}

	/// Returns `true` when the access credential is gone but a refresh credential remains,
	/// which is the only case the pre-flight renewer acts on.
	pub fn needs_preflight(&self) -> bool {
		self.access.is_none() && self.refresh.is_some()
	}

	/// Returns the credential stored for `kind`.
	pub fn get(&self, kind: CredentialKind) -> Option<&TokenSecret> {
		match kind {
			CredentialKind::Access => self.access.as_ref(),
			CredentialKind::Refresh => self.refresh.as_ref(),
		}
	}
}

/// Cookies parsed from an inbound `Cookie` header.
///
/// Credential cookies land in [`InboundCookies::credentials`]; all other cookies are kept in
/// their original order so they can be forwarded untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundCookies {
	/// Credentials found among the cookies.
	pub credentials: CredentialPair,
	/// Non-credential cookies as `(name, value)` pairs.
	pub passthrough: Vec<(String, String)>,
}
impl InboundCookies {
	/// Parses every `Cookie` header in `headers` (HTTP/2 clients may split them).
	pub fn from_headers(headers: &HeaderMap, names: &CookieNames) -> Self {
		let mut cookies = Self::default();

		for value in headers.get_all(header::COOKIE) {
			if let Ok(raw) = value.to_str() {
				cookies.extend_from_str(raw, names);
			}
		}

		cookies
	}

	/// Parses a single raw `Cookie` header value.
	pub fn parse(raw: &str, names: &CookieNames) -> Self {
		let mut cookies = Self::default();

		cookies.extend_from_str(raw, names);

		cookies
	}

	/// Returns a copy whose credentials are replaced by `credentials`.
	pub fn with_credentials(&self, credentials: CredentialPair) -> Self {
		Self { credentials, passthrough: self.passthrough.clone() }
	}

	/// Renders the cookies as a `Cookie` header value (passthrough cookies first, then access,
	/// then refresh). Returns `None` when there is nothing to send.
	pub fn render(&self, names: &CookieNames) -> Option<String> {
		let credentials = [
			(names.access.as_str(), self.credentials.access.as_ref()),
			(names.refresh.as_str(), self.credentials.refresh.as_ref()),
		];
		let parts = self
			.passthrough
			.iter()
			.map(|(name, value)| format!("{name}={value}"))
			.chain(credentials.into_iter().filter_map(|(name, secret)| {
				secret.map(|secret| format!("{name}={}", secret.expose()))
			}))
			.collect::<Vec<_>>();

		if parts.is_empty() { None } else { Some(parts.join("; ")) }
	}

	/// Renders the cookies into a header value, see [`InboundCookies::render`].
	pub fn to_header_value(
		&self,
		names: &CookieNames,
	) -> Result<Option<HeaderValue>, ::http::header::InvalidHeaderValue> {
		self.render(names).map(|raw| HeaderValue::from_str(&raw)).transpose()
	}

	fn extend_from_str(&mut self, raw: &str, names: &CookieNames) {
		for part in raw.split(';') {
			let Some((name, value)) = part.split_once('=') else {
				continue;
			};
			let name = name.trim();
			let value = value.trim();

			if name.is_empty() {
				continue;
			}

			match names.kind_of(name) {
				// Browsers send the most specific cookie first; keep it.
				Some(CredentialKind::Access) if self.credentials.access.is_none() =>
					self.credentials.access = non_empty_secret(value),
				Some(CredentialKind::Refresh) if self.credentials.refresh.is_none() =>
					self.credentials.refresh = non_empty_secret(value),
				Some(_) => {},
				None => self.passthrough.push((name.to_owned(), value.to_owned())),
			}
		}
	}
}

fn non_empty_secret(value: &str) -> Option<TokenSecret> {
	let value = value.trim_matches('"');

	if value.is_empty() { None } else { Some(TokenSecret::new(value)) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_splits_credentials_from_passthrough_cookies() {
		let names = CookieNames::default();
		let cookies = InboundCookies::parse(
			"csrftoken=abc; access_token=A1; theme=dark; refresh_token=R1",
			&names,
		);

		assert_eq!(cookies.credentials.access.as_ref().map(TokenSecret::expose), Some("A1"));
		assert_eq!(cookies.credentials.refresh.as_ref().map(TokenSecret::expose), Some("R1"));
		assert_eq!(
			cookies.passthrough,
			vec![("csrftoken".into(), "abc".into()), ("theme".into(), "dark".into())]
		);
	}

	#[test]
	fn parse_treats_empty_and_malformed_entries_as_absent() {
		let names = CookieNames::default();
		let cookies = InboundCookies::parse("access_token=; refresh_token=\"\"; junk; =x", &names);

		assert!(cookies.credentials.is_anonymous());
		assert!(cookies.passthrough.is_empty());
	}

	#[test]
	fn first_duplicate_credential_wins() {
		let names = CookieNames::default();
		let cookies = InboundCookies::parse("access_token=first; access_token=second", &names);

		assert_eq!(cookies.credentials.access.as_ref().map(TokenSecret::expose), Some("first"));
	}

	#[test]
	fn render_replaces_access_without_touching_other_cookies() {
		let names = CookieNames::default();
		let cookies =
			InboundCookies::parse("access_token=old; csrftoken=abc; refresh_token=R1", &names);
		let replaced = cookies
			.with_credentials(cookies.credentials.clone().with_access(TokenSecret::new("new")));

		assert_eq!(
			replaced.render(&names).as_deref(),
			Some("csrftoken=abc; access_token=new; refresh_token=R1")
		);
	}

	#[test]
	fn render_of_empty_jar_is_none() {
		let names = CookieNames::default();

		assert_eq!(InboundCookies::default().render(&names), None);
	}

	#[test]
	fn headers_are_merged_across_multiple_cookie_fields() {
		let names = CookieNames::new("sid_access", "sid_refresh");
		let mut headers = HeaderMap::new();

		headers.append(header::COOKIE, HeaderValue::from_static("sid_access=A"));
		headers.append(header::COOKIE, HeaderValue::from_static("sid_refresh=R; lang=en"));

		let cookies = InboundCookies::from_headers(&headers, &names);

		assert_eq!(cookies.credentials.access.as_ref().map(TokenSecret::expose), Some("A"));
		assert_eq!(cookies.credentials.refresh.as_ref().map(TokenSecret::expose), Some("R"));
		assert_eq!(cookies.passthrough, vec![("lang".into(), "en".into())]);
	}

	#[test]
	fn preflight_precondition_requires_refresh_without_access() {
		let refresh_only = CredentialPair::new(None, Some(TokenSecret::new("R")));
		let both = refresh_only.clone().with_access(TokenSecret::new("A"));

		assert!(refresh_only.needs_preflight());
		assert!(!both.needs_preflight());
		assert!(!CredentialPair::anonymous().needs_preflight());
	}
}

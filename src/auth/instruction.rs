//! Credential-state instructions delivered to the caller as `Set-Cookie` headers.
//!
//! Backend responses (refresh, logout, or the proxied resource itself) issue cookies that must
//! reach the browser. They are parsed into [`CredentialInstruction`]s so the relay can reason
//! about them (is this a clear? which credential does it touch?) while still rendering the
//! backend's header text unchanged. An [`InstructionSet`] keeps them in order; merging replaces
//! an earlier instruction only when it targets the same cookie (name, `Path`, and `Domain`).

// crates.io
use time::{OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem, macros};
// self
use crate::{_prelude::*, auth::TokenSecret};

const EPOCH_EXPIRES: &str = "Expires=Thu, 01 Jan 1970 00:00:00 GMT";
const COOKIE_DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 2] = [
	macros::format_description!(
		"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
	),
	macros::format_description!(
		"[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
	),
];

/// `SameSite` attribute values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
	/// Sent on same-site requests and top-level navigations.
	#[default]
	Lax,
	/// Sent on same-site requests only.
	Strict,
	/// Sent on every request; requires `Secure`.
	None,
}
impl SameSite {
	/// Returns the attribute value as written in a `Set-Cookie` header.
	pub const fn as_str(self) -> &'static str {
		match self {
			SameSite::Lax => "Lax",
			SameSite::Strict => "Strict",
			SameSite::None => "None",
		}
	}
}

/// Attributes applied to cookies the relay issues itself.
///
/// Cookies that come from the backend keep the backend's attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieAttributes {
	/// `Path` attribute.
	pub path: String,
	/// Optional `Domain` attribute.
	pub domain: Option<String>,
	/// Emits `HttpOnly` when true.
	pub http_only: bool,
	/// Emits `Secure` when true.
	pub secure: bool,
	/// `SameSite` attribute.
	pub same_site: SameSite,
}
impl CookieAttributes {
	fn render(&self) -> Vec<String> {
		let mut attributes = vec![format!("Path={}", self.path)];

		if let Some(domain) = &self.domain {
			attributes.push(format!("Domain={domain}"));
		}
		if self.http_only {
			attributes.push("HttpOnly".into());
		}
		if self.secure {
			attributes.push("Secure".into());
		}

		attributes.push(format!("SameSite={}", self.same_site.as_str()));

		attributes
	}
}
impl Default for CookieAttributes {
	fn default() -> Self {
		Self {
			path: "/".into(),
			domain: None,
			http_only: true,
			secure: true,
			same_site: SameSite::Lax,
		}
	}
}

/// What an instruction does to the named cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstructionAction {
	/// Store the given value.
	Set(TokenSecret),
	/// Remove the cookie from the caller.
	Clear,
}

/// One `Set-Cookie` directive.
///
/// Instructions parsed from a header keep that header's original text and render it verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialInstruction {
	/// Cookie name.
	pub name: String,
	/// Whether the cookie is set or cleared.
	pub action: InstructionAction,
	/// Attributes following the name/value pair, in their original order.
	pub attributes: Vec<String>,
	source: Option<HeaderValue>,
}
impl CredentialInstruction {
	/// Builds a set-instruction using relay-issued attributes.
	pub fn set(name: impl Into<String>, value: TokenSecret, attributes: &CookieAttributes) -> Self {
		Self {
			name: name.into(),
			action: InstructionAction::Set(value),
			attributes: attributes.render(),
			source: None,
		}
	}

	/// Builds a clear-instruction (`Max-Age=0` plus an epoch `Expires`).
	pub fn clear(name: impl Into<String>, attributes: &CookieAttributes) -> Self {
		let mut rendered = attributes.render();

		rendered.push("Max-Age=0".into());
		rendered.push(EPOCH_EXPIRES.into());

		Self { name: name.into(), action: InstructionAction::Clear, attributes: rendered, source: None }
	}

	/// Parses a raw `Set-Cookie` header value.
	///
	/// An empty value, a non-positive `Max-Age`, or an `Expires` in the past marks the
	/// instruction as a clear. Returns `None` when the cookie has no name.
	pub fn parse(raw: &str) -> Option<Self> {
		let mut segments = raw.split(';');
		let (name, value) = segments.next()?.split_once('=')?;
		let name = name.trim();

		if name.is_empty() {
			return None;
		}

		let value = value.trim().trim_matches('"');
		let attributes = segments
			.map(str::trim)
			.filter(|segment| !segment.is_empty())
			.map(str::to_owned)
			.collect::<Vec<_>>();
		let action = if value.is_empty() || attributes.iter().any(|attr| expires_cookie(attr)) {
			InstructionAction::Clear
		} else {
			InstructionAction::Set(TokenSecret::new(value))
		};

		Some(Self {
			name: name.to_owned(),
			action,
			attributes,
			source: HeaderValue::from_str(raw).ok(),
		})
	}

	/// Wraps a `Set-Cookie` header received from the backend.
	///
	/// Never fails: a line that does not parse is kept as an opaque, nameless instruction so it
	/// still reaches the caller byte for byte.
	pub fn from_header_value(value: &HeaderValue) -> Self {
		let raw = String::from_utf8_lossy(value.as_bytes());
		let mut instruction = Self::parse(&raw).unwrap_or_else(|| Self {
			name: String::new(),
			action: InstructionAction::Set(TokenSecret::new(raw.trim())),
			attributes: Vec::new(),
			source: None,
		});

		instruction.source = Some(value.clone());

		instruction
	}

	/// Returns `true` when the instruction removes the cookie.
	pub fn is_clear(&self) -> bool {
		matches!(self.action, InstructionAction::Clear)
	}

	/// Returns the value being set, if any.
	pub fn value(&self) -> Option<&TokenSecret> {
		match &self.action {
			InstructionAction::Set(value) => Some(value),
			InstructionAction::Clear => None,
		}
	}

	/// Returns the last value of the attribute `key` (case-insensitive), if present.
	pub fn attribute(&self, key: &str) -> Option<&str> {
		self.attributes.iter().rev().find_map(|attribute| {
			let (name, value) = attribute.split_once('=')?;

			name.trim().eq_ignore_ascii_case(key).then(|| value.trim())
		})
	}

	/// Returns `true` when both instructions target the same browser cookie: equal names,
	/// `Path`s, and `Domain`s.
	pub fn same_cookie(&self, other: &Self) -> bool {
		let domain = |instruction: &Self| {
			instruction
				.attribute("Domain")
				.map(|domain| domain.trim_start_matches('.').to_ascii_lowercase())
		};

		self.name == other.name
			&& self.attribute("Path") == other.attribute("Path")
			&& domain(self) == domain(other)
	}

	/// Renders the instruction as a `Set-Cookie` header value.
	///
	/// The output contains the secret; do not log it.
	pub fn render(&self) -> String {
		if let Some(source) = &self.source
			&& let Ok(raw) = source.to_str()
		{
			return raw.to_owned();
		}

		let value = self.value().map(TokenSecret::expose).unwrap_or_default();
		let mut rendered = format!("{}={value}", self.name);

		for attribute in &self.attributes {
			rendered.push_str("; ");
			rendered.push_str(attribute);
		}

		rendered
	}

	/// Renders the instruction into a header value.
	pub fn to_header_value(&self) -> Result<HeaderValue, ::http::header::InvalidHeaderValue> {
		match &self.source {
			Some(source) => Ok(source.clone()),
			None => HeaderValue::from_str(&self.render()),
		}
	}
}

/// Ordered collection of `Set-Cookie` instructions.
///
/// Headers read from one response are kept as they came, duplicates included. Inserting or
/// merging replaces an earlier instruction for the same cookie (see
/// [`CredentialInstruction::same_cookie`]) and moves it to the end, so whichever step of a
/// request ran last decides that cookie's final state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstructionSet(Vec<CredentialInstruction>);
impl InstructionSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Collects every `Set-Cookie` header in `headers`, in order and unchanged.
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self(
			headers
				.get_all(header::SET_COOKIE)
				.iter()
				.map(CredentialInstruction::from_header_value)
				.collect(),
		)
	}

	/// Inserts an instruction, replacing any earlier one for the same cookie.
	pub fn insert(&mut self, instruction: CredentialInstruction) {
		self.0.retain(|existing| !existing.same_cookie(&instruction));
		self.0.push(instruction);
	}

	/// Merges `later` into `self`; instructions from `later` win when they target the same
	/// cookie.
	pub fn merge(&mut self, later: InstructionSet) {
		for instruction in later {
			self.insert(instruction);
		}
	}

	/// Adds a relay-issued clear for each name that is not already being cleared.
	pub fn ensure_cleared<'a, I>(&mut self, names: I, attributes: &CookieAttributes)
	where
		I: IntoIterator<Item = &'a str>,
	{
		for name in names {
			if !self.clears(name) {
				self.insert(CredentialInstruction::clear(name, attributes));
			}
		}
	}

	/// Returns the last instruction for `name`, if any.
	pub fn get(&self, name: &str) -> Option<&CredentialInstruction> {
		self.0.iter().rev().find(|instruction| instruction.name == name)
	}

	/// Returns `true` when the last instruction for `name` clears it.
	pub fn clears(&self, name: &str) -> bool {
		self.get(name).is_some_and(CredentialInstruction::is_clear)
	}

	/// Returns the number of instructions.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the set is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the instructions in order.
	pub fn iter(&self) -> std::slice::Iter<'_, CredentialInstruction> {
		self.0.iter()
	}

	/// Appends one `Set-Cookie` header per instruction. Instructions that cannot be encoded as a
	/// header value are skipped.
	pub fn write_headers(&self, headers: &mut HeaderMap) {
		for instruction in &self.0 {
			if let Ok(value) = instruction.to_header_value() {
				headers.append(header::SET_COOKIE, value);
			}
		}
	}
}
impl FromIterator<CredentialInstruction> for InstructionSet {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = CredentialInstruction>,
	{
		let mut set = Self::new();

		for instruction in iter {
			set.insert(instruction);
		}

		set
	}
}
impl IntoIterator for InstructionSet {
	type IntoIter = std::vec::IntoIter<CredentialInstruction>;
	type Item = CredentialInstruction;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
impl<'a> IntoIterator for &'a InstructionSet {
	type IntoIter = std::slice::Iter<'a, CredentialInstruction>;
	type Item = &'a CredentialInstruction;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

fn expires_cookie(attribute: &str) -> bool {
	let Some((key, value)) = attribute.split_once('=') else {
		return false;
	};
	let key = key.trim();
	let value = value.trim();

	if key.eq_ignore_ascii_case("max-age") {
		return value.parse::<i64>().is_ok_and(|seconds| seconds <= 0);
	}
	if key.eq_ignore_ascii_case("expires") {
		return parse_cookie_date(value).is_some_and(|moment| moment <= OffsetDateTime::now_utc());
	}

	false
}

fn parse_cookie_date(raw: &str) -> Option<OffsetDateTime> {
	COOKIE_DATE_FORMATS
		.iter()
		.find_map(|format| PrimitiveDateTime::parse(raw, *format).ok())
		.map(PrimitiveDateTime::assume_utc)
}

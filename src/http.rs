//! Transport primitives for backend calls.
//!
//! The module exposes [`BackendHttpClient`] together with the crate-owned
//! [`BackendRequest`]/[`BackendResponse`] pair so downstream crates can plug in custom HTTP
//! clients (or scripted fakes) without the flows depending on reqwest.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::{backend::BackendDescriptor, error::ConfigError};

/// Boxed future returned by [`BackendHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<BackendResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing backend calls.
///
/// The trait is the relay's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one instance can be shared behind `Arc` by every request, and
/// the returned future must be `Send` so relay futures can hop executors. Implementations
/// must not follow redirects; a redirect is reported to the relay as-is.
pub trait BackendHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes one request and buffers the full response.
	fn execute(&self, request: BackendRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Outbound backend call.
#[derive(Clone, Debug)]
pub struct BackendRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Request headers, including the rendered `Cookie` header when credentials are sent.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl BackendRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Returns the outbound `Cookie` header as a string, if any.
	pub fn cookie_header(&self) -> Option<&str> {
		self.headers.get(header::COOKIE).and_then(|value| value.to_str().ok())
	}
}

/// Buffered backend response.
#[derive(Clone, Debug)]
pub struct BackendResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers, including any `Set-Cookie` fields.
	pub headers: HeaderMap,
	/// Response body.
	pub body: Vec<u8>,
}
impl BackendResponse {
	/// Creates a response without headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns a lossy UTF-8 view of the body for diagnostics.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Backend calls never follow redirects. Configure any custom [`ReqwestClient`] passed to
/// [`ReqwestHttpClient::with_client`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the descriptor's per-call timeout with redirects disabled.
	pub fn from_descriptor(descriptor: &BackendDescriptor) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = descriptor.request_timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl BackendHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: BackendRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method, request.url).headers(request.headers);

			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(BackendResponse { status, headers, body })
		})
	}
}

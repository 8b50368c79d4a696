//! Shared helpers for flow implementations (request context, backend calls, classification).

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, InboundCookies, TokenSecret},
	backend::{ResponseContext, Verdict},
	error::{ConfigError, TransportError},
	flows::Relay,
	http::{BackendHttpClient, BackendRequest, BackendResponse},
};

/// Immutable description of one inbound request.
#[derive(Clone, Debug)]
pub struct RequestContext {
	/// HTTP method to use for every resource call.
	pub method: Method,
	/// Query parameters, forwarded unchanged and in order.
	pub query: Vec<(String, String)>,
	/// Credentials and passthrough cookies from the inbound `Cookie` header.
	pub cookies: InboundCookies,
	/// Extra headers forwarded to the backend. Any `Cookie` entry is ignored.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl RequestContext {
	/// Creates a context for the given method without credentials.
	pub fn new(method: Method) -> Self {
		Self {
			method,
			query: Vec::new(),
			cookies: InboundCookies::default(),
			headers: HeaderMap::new(),
			body: None,
		}
	}

	/// Creates a `GET` context.
	pub fn get() -> Self {
		Self::new(Method::GET)
	}

	/// Appends one query parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Appends several query parameters.
	pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.query.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));

		self
	}

	/// Replaces the parsed inbound cookies.
	pub fn with_cookies(mut self, cookies: InboundCookies) -> Self {
		self.cookies = cookies;

		self
	}

	/// Replaces the credential pair, keeping passthrough cookies.
	pub fn with_credentials(mut self, credentials: CredentialPair) -> Self {
		self.cookies.credentials = credentials;

		self
	}

	/// Adds a forwarded header.
	pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Returns the inbound credential pair.
	pub fn credentials(&self) -> &CredentialPair {
		&self.cookies.credentials
	}
}

impl<C> Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Issues one resource call. `cookies` of `None` omits the `Cookie` header entirely.
	pub(crate) async fn call_resource(
		&self,
		ctx: &RequestContext,
		backend_path: &str,
		cookies: Option<&InboundCookies>,
	) -> Result<BackendResponse> {
		let url = self.descriptor.resource_url(backend_path, &ctx.query).map_err(ConfigError::from)?;
		let mut request = BackendRequest::new(ctx.method.clone(), url);

		request.headers = ctx.headers.clone();
		request.headers.remove(header::COOKIE);
		request.body = ctx.body.clone();

		if let Some(cookies) = cookies
			&& let Some(value) =
				cookies.to_header_value(&self.descriptor.cookies).map_err(ConfigError::from)?
		{
			request.headers.insert(header::COOKIE, value);
		}

		self.metrics.record_backend_call();

		self.execute(request).await
	}

	/// POSTs to a session endpoint carrying at most one credential cookie.
	pub(crate) async fn post_session(
		&self,
		url: &Url,
		cookie: Option<(&str, &TokenSecret)>,
	) -> Result<BackendResponse> {
		let mut request = BackendRequest::new(Method::POST, url.clone());

		if let Some((name, secret)) = cookie {
			let value = HeaderValue::from_str(&format!("{name}={}", secret.expose()))
				.map_err(ConfigError::from)?;

			request.headers.insert(header::COOKIE, value);
		}

		self.execute(request).await
	}

	pub(crate) fn classify(&self, response: &BackendResponse) -> Verdict {
		let ctx = ResponseContext::new(response.status.as_u16());
		let ctx = if response.status.is_success() {
			ctx
		} else {
			ctx.with_body_preview(response.body_text())
		};

		self.strategy.classify(&ctx)
	}

	async fn execute(&self, request: BackendRequest) -> Result<BackendResponse> {
		self.http_client
			.execute(request)
			.await
			.map_err(|e| TransportError::network(e).into())
	}
}

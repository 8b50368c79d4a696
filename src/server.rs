//! axum adapter: catch-all proxy route, pre-flight middleware, and [`Outcome`] responses.
//!
//! ```no_run
//! # async fn demo(relay: std::sync::Arc<session_relay::flows::ReqwestRelay>) {
//! let app = session_relay::server::app(relay);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{Path, RawQuery, Request, State},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::any,
};
// self
use crate::{
	_prelude::*,
	auth::{CookieNames, InboundCookies, InstructionSet},
	flows::{Relay, RequestContext},
	http::BackendHttpClient,
	outcome::Outcome,
};

/// Prefix under which [`router`] mounts the proxy.
pub const PROXY_PREFIX: &str = "/api/proxy";

const FORWARDED_HEADERS: [header::HeaderName; 3] =
	[header::ACCEPT, header::ACCEPT_LANGUAGE, header::CONTENT_TYPE];

impl IntoResponse for Outcome {
	fn into_response(self) -> Response {
		let mut response = (self.status, self.body).into_response();
		let headers = response.headers_mut();

		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.instructions.write_headers(headers);

		response
	}
}

/// Builds the proxy router with the pre-flight middleware applied.
pub fn app<C>(relay: Arc<Relay<C>>) -> Router
where
	C: ?Sized + BackendHttpClient,
{
	with_preflight(router(relay.clone()), relay)
}

/// Mounts `{PROXY_PREFIX}/{*path}` for every method, forwarding to backend `/{path}/`.
pub fn router<C>(relay: Arc<Relay<C>>) -> Router
where
	C: ?Sized + BackendHttpClient,
{
	Router::new()
		.route(&format!("{PROXY_PREFIX}/{{*path}}"), any(proxy_handler::<C>))
		.with_state(relay)
}

/// Wraps `router` with [`preflight_middleware`].
pub fn with_preflight<C>(router: Router, relay: Arc<Relay<C>>) -> Router
where
	C: ?Sized + BackendHttpClient,
{
	router.layer(middleware::from_fn_with_state(relay, preflight_middleware::<C>))
}

/// Renews a missing access credential before the inner service runs.
///
/// The request's `Cookie` header is rewritten from the renewed pair. The renewal's
/// set-instructions are emitted before the inner response's `Set-Cookie` headers, which pass
/// through unchanged; a renewal instruction for a cookie the inner response also sets or clears
/// is dropped, so the downstream decision wins.
pub async fn preflight_middleware<C>(
	State(relay): State<Arc<Relay<C>>>,
	mut request: Request,
	next: Next,
) -> Response
where
	C: ?Sized + BackendHttpClient,
{
	let names = &relay.descriptor.cookies;
	let cookies = InboundCookies::from_headers(request.headers(), names);
	let preflight = relay.preflight(&cookies.credentials).await;

	if !preflight.renewed {
		return next.run(request).await;
	}

	let renewed = cookies.with_credentials(preflight.credentials);
	let headers = request.headers_mut();

	headers.remove(header::COOKIE);

	if let Ok(Some(value)) = renewed.to_header_value(names) {
		headers.insert(header::COOKIE, value);
	}

	let mut response = next.run(request).await;
	let downstream = InstructionSet::from_headers(response.headers());
	let renewal = preflight
		.instructions
		.into_iter()
		.filter(|instruction| !downstream.iter().any(|later| later.same_cookie(instruction)))
		.collect::<InstructionSet>();
	let headers = response.headers_mut();

	headers.remove(header::SET_COOKIE);
	renewal.write_headers(headers);
	downstream.write_headers(headers);

	response
}

/// Builds a [`RequestContext`] from the pieces of an inbound request.
pub fn request_context(
	method: Method,
	query: Option<&str>,
	headers: &HeaderMap,
	names: &CookieNames,
	body: Bytes,
) -> RequestContext {
	let query = query
		.map(|raw| url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect::<Vec<_>>())
		.unwrap_or_default();
	let mut ctx = RequestContext::new(method)
		.with_query_pairs(query)
		.with_cookies(InboundCookies::from_headers(headers, names));

	for name in FORWARDED_HEADERS {
		for value in headers.get_all(&name) {
			ctx = ctx.with_header(name.clone(), value.clone());
		}
	}

	if body.is_empty() { ctx } else { ctx.with_body(body.to_vec()) }
}

/// Maps the wildcard part of a proxy route to a backend path.
///
/// Returns `None` for paths with empty, `.`, or `..` segments. A single trailing slash is
/// accepted; the result always ends with one.
pub fn backend_path(raw: &str) -> Option<String> {
	let trimmed = raw.strip_suffix('/').unwrap_or(raw);

	if trimmed.is_empty() || trimmed.split('/').any(|segment| matches!(segment, "" | "." | "..")) {
		return None;
	}

	Some(format!("/{trimmed}/"))
}

async fn proxy_handler<C>(
	State(relay): State<Arc<Relay<C>>>,
	Path(path): Path<String>,
	method: Method,
	RawQuery(query): RawQuery,
	headers: HeaderMap,
	body: Bytes,
) -> Response
where
	C: ?Sized + BackendHttpClient,
{
	let Some(backend_path) = backend_path(&path) else {
		return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "Invalid path" })))
			.into_response();
	};
	let names = &relay.descriptor.cookies;
	let ctx = request_context(method, query.as_deref(), &headers, names, body);

	relay.forward(&ctx, &backend_path).await.into_response()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn backend_path_rejects_traversal_and_empty_segments() {
		assert_eq!(backend_path("posts/7").as_deref(), Some("/posts/7/"));
		assert_eq!(backend_path("posts/7/").as_deref(), Some("/posts/7/"));

		for raw in ["", "/", "posts//7", "posts/../admin", "./posts", "posts/.."] {
			assert_eq!(backend_path(raw), None, "{raw:?} should be rejected.");
		}
	}

	#[test]
	fn request_context_keeps_query_order_and_selected_headers() {
		let names = CookieNames::default();
		let mut headers = HeaderMap::new();

		headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
		headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer leak"));
		headers.insert(header::COOKIE, HeaderValue::from_static("access_token=A; theme=dark"));

		let ctx = request_context(
			Method::GET,
			Some("page=2&q=a+b&page=3"),
			&headers,
			&names,
			Bytes::new(),
		);

		assert_eq!(
			ctx.query,
			vec![
				("page".to_owned(), "2".to_owned()),
				("q".to_owned(), "a b".to_owned()),
				("page".to_owned(), "3".to_owned()),
			]
		);
		assert!(ctx.headers.contains_key(header::ACCEPT));
		assert!(!ctx.headers.contains_key(header::AUTHORIZATION));
		assert!(!ctx.headers.contains_key(header::COOKIE));
		assert!(ctx.credentials().access.is_some());
		assert_eq!(ctx.body, None);
	}

	#[test]
	fn outcome_response_carries_json_and_cookies() {
		let outcome = Outcome::not_found(crate::outcome::TerminalState::NotFoundAnonymous)
			.with_instructions(
				[crate::auth::CredentialInstruction::clear(
					"access_token",
					&Default::default(),
				)]
				.into_iter()
				.collect(),
			);
		let response = outcome.into_response();

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		assert_eq!(
			response.headers().get(header::CONTENT_TYPE),
			Some(&HeaderValue::from_static("application/json"))
		);
		assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 1);
	}
}

//! Shared helpers for integration tests: a scripted backend transport and fixtures.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, VecDeque},
	sync::Arc,
	time::Duration,
};
// crates.io
use http::{HeaderValue, StatusCode, header};
use parking_lot::Mutex;
use url::Url;
// self
use session_relay::{
	backend::BackendDescriptor,
	flows::Relay,
	http::{BackendHttpClient, BackendRequest, BackendResponse, HttpFuture},
};

pub const BASE_URL: &str = "https://api.example.com/api/v1";
pub const REFRESH_PATH: &str = "/api/v1/users/refresh/";
pub const LOGOUT_PATH: &str = "/api/v1/users/logout/";

/// Transport failure returned by [`ScriptedBackend`].
#[derive(Debug, thiserror::Error)]
#[error("Scripted transport failure.")]
pub struct ScriptedTransportError;

enum Step {
	Respond(BackendResponse),
	Fail,
	Stall(Duration, BackendResponse),
}

/// In-memory backend that replays scripted responses per URL path and records every request.
#[derive(Default)]
pub struct ScriptedBackend {
	script: Mutex<HashMap<String, VecDeque<Step>>>,
	requests: Mutex<Vec<BackendRequest>>,
}
impl ScriptedBackend {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Queues a response for the next call to `path`.
	pub fn respond(&self, path: &str, response: BackendResponse) -> &Self {
		self.push(path, Step::Respond(response))
	}

	/// Queues a transport failure for the next call to `path`.
	pub fn fail(&self, path: &str) -> &Self {
		self.push(path, Step::Fail)
	}

	/// Queues a response delivered after `delay`.
	pub fn stall(&self, path: &str, delay: Duration, response: BackendResponse) -> &Self {
		self.push(path, Step::Stall(delay, response))
	}

	/// Returns every recorded request.
	pub fn requests(&self) -> Vec<BackendRequest> {
		self.requests.lock().clone()
	}

	/// Returns the requests sent to `path`.
	pub fn requests_to(&self, path: &str) -> Vec<BackendRequest> {
		self.requests.lock().iter().filter(|request| request.url.path() == path).cloned().collect()
	}

	/// Returns the `Cookie` header of each request sent to `path` (`None` when absent).
	pub fn cookies_sent_to(&self, path: &str) -> Vec<Option<String>> {
		self.requests_to(path)
			.iter()
			.map(|request| request.cookie_header().map(str::to_owned))
			.collect()
	}

	fn push(&self, path: &str, step: Step) -> &Self {
		self.script.lock().entry(path.to_owned()).or_default().push_back(step);

		self
	}
}
impl BackendHttpClient for ScriptedBackend {
	type TransportError = ScriptedTransportError;

	fn execute(&self, request: BackendRequest) -> HttpFuture<'_, Self::TransportError> {
		let path = request.url.path().to_owned();
		let step = self.script.lock().get_mut(&path).and_then(VecDeque::pop_front);

		self.requests.lock().push(request);

		Box::pin(async move {
			match step {
				Some(Step::Respond(response)) => Ok(response),
				Some(Step::Fail) => Err(ScriptedTransportError),
				Some(Step::Stall(delay, response)) => {
					tokio::time::sleep(delay).await;

					Ok(response)
				},
				None => Ok(BackendResponse::new(
					StatusCode::IM_A_TEAPOT,
					format!("{{\"unscripted\":\"{path}\"}}"),
				)),
			}
		})
	}
}

/// Descriptor rooted at [`BASE_URL`] with default cookie names and endpoints.
pub fn descriptor() -> BackendDescriptor {
	BackendDescriptor::builder(Url::parse(BASE_URL).expect("Base URL fixture should parse."))
		.build()
		.expect("Default descriptor should build.")
}

/// Relay over a fresh scripted backend.
pub fn scripted_relay() -> (Relay<ScriptedBackend>, Arc<ScriptedBackend>) {
	scripted_relay_with(descriptor())
}

/// Relay over a fresh scripted backend using a custom descriptor.
pub fn scripted_relay_with(
	descriptor: BackendDescriptor,
) -> (Relay<ScriptedBackend>, Arc<ScriptedBackend>) {
	let backend = ScriptedBackend::new();

	(Relay::with_http_client(descriptor, backend.clone()), backend)
}

/// `200` JSON response.
pub fn ok_json(body: &str) -> BackendResponse {
	status_json(StatusCode::OK, body)
}

/// JSON response with an arbitrary status.
pub fn status_json(status: StatusCode, body: &str) -> BackendResponse {
	let mut response = BackendResponse::new(status, body);

	response
		.headers
		.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

	response
}

/// Adds one `Set-Cookie` header per entry.
pub fn with_set_cookies(mut response: BackendResponse, cookies: &[&str]) -> BackendResponse {
	for cookie in cookies {
		response.headers.append(
			header::SET_COOKIE,
			HeaderValue::from_str(cookie).expect("Set-Cookie fixture should be a valid header."),
		);
	}

	response
}

/// Installs a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::new("session_relay=debug"))
		.with_test_writer()
		.try_init();
}

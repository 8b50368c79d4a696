//! Serves the session relay in front of a backend API.
//!
//! `RELAY_BACKEND_URL` (default `http://127.0.0.1:8000/api/v1`) points at the backend and
//! `RELAY_LISTEN` (default `127.0.0.1:3000`) is the listen address. Proxied resources are
//! reachable under `/api/proxy/`, e.g. `curl -b access_token=... localhost:3000/api/proxy/posts`.

// std
use std::{env, sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use url::Url;
// self
use session_relay::{backend::BackendDescriptor, flows::ReqwestRelay, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let backend_url =
		env::var("RELAY_BACKEND_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/api/v1".into());
	let listen = env::var("RELAY_LISTEN").unwrap_or_else(|_| "127.0.0.1:3000".into());
	let descriptor = BackendDescriptor::builder(Url::parse(&backend_url)?)
		.request_timeout(Duration::from_secs(10))
		.overall_timeout(Duration::from_secs(30))
		.build()?;
	let relay = Arc::new(ReqwestRelay::new(descriptor)?);
	let listener = TcpListener::bind(&listen).await?;

	tracing::info!(%listen, backend = %backend_url, "Session relay listening.");

	axum::serve(listener, server::app(relay)).await?;

	Ok(())
}

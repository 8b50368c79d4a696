//! Session flows coordinated by the [`Relay`].
//!
//! Each flow lives in its own module and extends [`Relay`] with one operation: `forward`
//! (attempt, refresh, retry, anonymous fallback), `refresh`, `logout`, and `preflight`.

pub mod common;
pub mod forward;
pub mod logout;
pub mod metrics;
pub mod preflight;
pub mod refresh;

pub use common::*;
pub use self::metrics::*;
pub use preflight::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	backend::{BackendDescriptor, BackendStrategy, DefaultBackendStrategy},
	http::BackendHttpClient,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Relay specialized for the crate's default reqwest transport.
pub type ReqwestRelay = Relay<ReqwestHttpClient>;

/// Coordinates session flows against a single backend descriptor.
///
/// The relay owns the HTTP client, descriptor, and strategy so individual flows only deal with
/// their own state machine. It holds no per-caller state; share one instance behind `Arc`.
pub struct Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// HTTP client used for every backend call.
	pub http_client: Arc<C>,
	/// Backend descriptor defining endpoints, cookie names, and timeouts.
	pub descriptor: BackendDescriptor,
	/// Strategy classifying resource responses.
	pub strategy: Arc<dyn BackendStrategy>,
	/// Shared counters for backend, refresh, and logout calls.
	pub metrics: Arc<RelayMetrics>,
}
impl<C> Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Creates a relay that reuses the caller-provided transport.
	pub fn with_http_client(descriptor: BackendDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			descriptor,
			strategy: Arc::new(DefaultBackendStrategy),
			metrics: Default::default(),
		}
	}

	/// Replaces the response classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn BackendStrategy>) -> Self {
		self.strategy = strategy;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Relay<ReqwestHttpClient> {
	/// Creates a relay with its own reqwest transport configured from the descriptor.
	pub fn new(descriptor: BackendDescriptor) -> Result<Self> {
		descriptor.validate().map_err(ConfigError::from)?;

		let http_client = ReqwestHttpClient::from_descriptor(&descriptor)?;

		Ok(Self::with_http_client(descriptor, http_client))
	}
}
impl<C> Clone for Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			descriptor: self.descriptor.clone(),
			strategy: self.strategy.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<C> Debug for Relay<C>
where
	C: ?Sized + BackendHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("descriptor", &self.descriptor)
			.field("metrics", &self.metrics)
			.finish()
	}
}

//! Relay-level error types shared across the refresh and logout clients.
//!
//! The forwarding proxy never surfaces these to its caller; every failure is translated into an
//! [`Outcome`](crate::outcome::Outcome). They exist so the session clients can propagate with
//! `?` and so observability hooks can tell failure causes apart.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical relay error.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The caller holds no refresh credential, so there is nothing to exchange.
	#[error("No refresh credential is available for renewal.")]
	MissingRefreshCredential,
	/// The refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the credential with status {status}.")]
	RefreshRejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
	/// The refresh endpoint succeeded but issued no usable access credential.
	#[error("Refresh endpoint did not issue a new access credential.")]
	MissingAccessCredential,
	/// The logout endpoint answered with a non-success status.
	#[error("Logout endpoint answered with status {status}.")]
	LogoutRejected {
		/// HTTP status returned by the logout endpoint.
		status: u16,
	},
}
impl Error {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::MissingRefreshCredential => "missing_refresh_credential",
			Self::RefreshRejected { .. } => "refresh_rejected",
			Self::MissingAccessCredential => "missing_access_credential",
			Self::LogoutRejected { .. } => "logout_rejected",
		}
	}
}

/// Configuration and request-construction failures raised by the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A header value (usually the rendered `Cookie` header) contains invalid bytes.
	#[error("Outbound header value is invalid.")]
	InvalidHeader(#[from] ::http::header::InvalidHeaderValue),
	/// The backend descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::backend::BackendDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

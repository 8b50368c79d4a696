//! Cookie-session relay for backend APIs: forward requests with the caller's credentials,
//! renew an expired access token exactly once, and fall back to anonymous access when the
//! session cannot be recovered.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod backend;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod outcome;
#[cfg(feature = "axum")] pub mod server;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use ::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "axum")] pub use axum;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)]
use {
	color_eyre as _, httpmock as _, parking_lot as _, tower as _, tracing_subscriber as _,
};

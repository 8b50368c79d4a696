//! Backend-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes the validated [`BackendDescriptor`] covering the base URL, session
//! endpoints, credential cookie names, and timeouts. `strategy` defines [`BackendStrategy`], an
//! HTTP-client-agnostic hook the flows use to turn a backend status into a [`Verdict`].

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;

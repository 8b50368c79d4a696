//! Atomic counters shared by relay flows.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for relay calls.
#[derive(Debug, Default)]
pub struct RelayMetrics {
	backend_calls: AtomicU64,
	refresh_attempts: AtomicU64,
	refresh_success: AtomicU64,
	refresh_failure: AtomicU64,
	logout_calls: AtomicU64,
}
impl RelayMetrics {
	/// Returns the number of resource calls issued to the backend.
	pub fn backend_calls(&self) -> u64 {
		self.backend_calls.load(Ordering::Relaxed)
	}

	/// Returns the total number of refresh attempts.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that issued a new access credential.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh attempts, including local failures.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failure.load(Ordering::Relaxed)
	}

	/// Returns the number of logout calls.
	pub fn logout_calls(&self) -> u64 {
		self.logout_calls.load(Ordering::Relaxed)
	}

	pub(crate) fn record_backend_call(&self) {
		self.backend_calls.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_logout_call(&self) {
		self.logout_calls.fetch_add(1, Ordering::Relaxed);
	}
}

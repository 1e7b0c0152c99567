// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::store::TokenSource;

/// Thread-safe counters for credential acquisition.
#[derive(Debug, Default)]
pub struct AcquisitionMetrics {
	local_hits: AtomicU64,
	distributed_hits: AtomicU64,
	remote_fetches: AtomicU64,
	failures: AtomicU64,
}
impl AcquisitionMetrics {
	/// Returns the number of acquisitions served by the in-process record.
	pub fn local_hits(&self) -> u64 {
		self.local_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of acquisitions rehydrated from the distributed cache.
	pub fn distributed_hits(&self) -> u64 {
		self.distributed_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of successful remote issuances.
	pub fn remote_fetches(&self) -> u64 {
		self.remote_fetches.load(Ordering::Relaxed)
	}

	/// Returns the number of failed acquisitions.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_source(&self, source: TokenSource) {
		let counter = match source {
			TokenSource::Local => &self.local_hits,
			TokenSource::Distributed => &self.distributed_hits,
			TokenSource::Remote => &self.remote_fetches,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

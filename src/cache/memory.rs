//! Thread-safe in-process [`DistributedCache`] for single-process deployments and tests.

// crates.io
use tokio::time::{Duration, Instant};
// self
use crate::{
	_prelude::*,
	cache::{CacheError, CacheFuture, DistributedCache},
};

type CacheMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

#[derive(Clone, Debug)]
struct CacheEntry {
	value: String,
	expires_at: Instant,
}
impl CacheEntry {
	fn remaining(&self, now: Instant) -> u64 {
		self.expires_at.saturating_duration_since(now).as_secs()
	}
}

/// In-process cache honoring per-key TTLs against the Tokio clock.
///
/// Expiry follows `tokio::time`, so paused-clock tests observe TTLs shrinking as time advances.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	/// Returns the number of keys that have not yet expired.
	pub fn len(&self) -> usize {
		let now = Instant::now();

		self.0.read().values().filter(|entry| entry.remaining(now) > 0).count()
	}

	/// Returns `true` when no live keys are stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn get_now(map: &CacheMap, key: &str) -> Option<String> {
		let now = Instant::now();

		map.read().get(key).filter(|entry| entry.remaining(now) > 0).map(|entry| entry.value.clone())
	}

	fn ttl_now(map: &CacheMap, key: &str) -> u64 {
		map.read().get(key).map(|entry| entry.remaining(Instant::now())).unwrap_or(0)
	}

	fn set_now(map: &CacheMap, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
		if ttl_secs == 0 {
			map.write().remove(key);

			return Ok(());
		}

		let expires_at = Instant::now().checked_add(Duration::from_secs(ttl_secs)).ok_or_else(|| {
			CacheError::Backend { message: format!("TTL of {ttl_secs} seconds overflows the clock") }
		})?;

		map.write().insert(key.to_owned(), CacheEntry { value: value.to_owned(), expires_at });

		Ok(())
	}
}
impl DistributedCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move { Ok(Self::get_now(&self.0, key)) })
	}

	fn ttl<'a>(&'a self, key: &'a str) -> CacheFuture<'a, u64> {
		Box::pin(async move { Ok(Self::ttl_now(&self.0, key)) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str, ttl_secs: u64) -> CacheFuture<'a, ()> {
		Box::pin(async move { Self::set_now(&self.0, key, value, ttl_secs) })
	}
}

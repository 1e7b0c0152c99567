//! Shared key/value cache contract used to hand credentials between processes.
//!
//! Every process sharing an application id reads and writes the same keys
//! (`<kind prefix><app id>`), so the cache is the authoritative cross-process source of a
//! credential. Writes are plain sets without compare-and-swap; concurrent writers may leave a
//! slightly different TTL behind, which the token store tolerates.

pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use memory::MemoryCache;
#[cfg(feature = "redis")] pub use self::redis::RedisCache;

// self
use crate::_prelude::*;

/// Boxed future returned by [`DistributedCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key/value store with per-key TTL, reachable by every process holding the same app id.
pub trait DistributedCache
where
	Self: Send + Sync,
{
	/// Fetches the value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

	/// Returns the remaining lifetime of `key` in whole seconds; `0` when the key is missing or
	/// has no expiry.
	fn ttl<'a>(&'a self, key: &'a str) -> CacheFuture<'a, u64>;

	/// Stores `value` under `key` for `ttl_secs` seconds.
	fn set<'a>(&'a self, key: &'a str, value: &'a str, ttl_secs: u64) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`DistributedCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Connection to the cache backend could not be established.
	#[error("Cache connection failure: {message}.")]
	Connection {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for a cache command.
	#[error("Cache backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

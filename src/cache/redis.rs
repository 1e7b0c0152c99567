//! Redis-backed [`DistributedCache`] over a multiplexed `ConnectionManager`.

// crates.io
use redis::aio::ConnectionManager;
// self
use crate::{
	_prelude::*,
	cache::{CacheError, CacheFuture, DistributedCache},
};

/// Redis cache shared by every process holding the same application id.
#[derive(Clone)]
pub struct RedisCache {
	connection_manager: ConnectionManager,
}
impl RedisCache {
	/// Connects to the Redis server at `url` (`redis://[:password@]host:port[/db]`).
	pub async fn connect(url: &str) -> Result<Self, CacheError> {
		let client = redis::Client::open(url).map_err(|e| CacheError::Connection {
			message: format!("Failed to create Redis client: {e}"),
		})?;
		let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
			CacheError::Connection { message: format!("Failed to connect to Redis: {e}") }
		})?;

		Ok(Self { connection_manager })
	}

	/// Wraps an already-established connection manager.
	pub fn with_connection_manager(connection_manager: ConnectionManager) -> Self {
		Self { connection_manager }
	}
}
impl Debug for RedisCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedisCache").field("connection_manager", &"ConnectionManager").finish()
	}
}
impl DistributedCache for RedisCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		let mut conn = self.connection_manager.clone();

		Box::pin(async move {
			redis::cmd("GET").arg(key).query_async::<Option<String>>(&mut conn).await.map_err(|e| {
				CacheError::Backend { message: format!("Redis GET failed: {e}") }
			})
		})
	}

	fn ttl<'a>(&'a self, key: &'a str) -> CacheFuture<'a, u64> {
		let mut conn = self.connection_manager.clone();

		Box::pin(async move {
			// -2 for a missing key, -1 for a key without expiry.
			let ttl = redis::cmd("TTL").arg(key).query_async::<i64>(&mut conn).await.map_err(
				|e| CacheError::Backend { message: format!("Redis TTL failed: {e}") },
			)?;

			Ok(u64::try_from(ttl).unwrap_or(0))
		})
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str, ttl_secs: u64) -> CacheFuture<'a, ()> {
		let mut conn = self.connection_manager.clone();

		Box::pin(async move {
			redis::cmd("SETEX")
				.arg(key)
				.arg(ttl_secs.max(1))
				.arg(value)
				.query_async::<()>(&mut conn)
				.await
				.map_err(|e| CacheError::Backend { message: format!("Redis SETEX failed: {e}") })
		})
	}
}

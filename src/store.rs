//! Two-level credential store with per-kind single-flight acquisition.
//!
//! [`TokenStore::get`] serializes the whole acquisition sequence for one credential kind behind
//! an async mutex:
//!
//! 1. a non-empty in-process record is returned without I/O;
//! 2. otherwise a distributed-cache entry with a positive TTL is rehydrated into a new record;
//! 3. otherwise the [`RemoteIssuer`] mints a credential, which is written to the distributed
//!    cache and installed as the new record.
//!
//! Callers queued on the mutex observe the record installed by the holder, so concurrent calls in
//! one process trigger at most one issuance. Every record owns a countdown task that clears it
//! when its lifetime runs out; replacing or clearing a record shuts the task down first.

mod countdown;
mod metrics;

pub use metrics::AcquisitionMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AppId, CredentialKind, Token, TokenSecret},
	cache::DistributedCache,
	error::UnmarshalError,
	issuer::{self, RemoteIssuer},
	obs::{self, FlowSpan},
};
use countdown::TokenLease;

/// Where an acquisition found its credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// In-process record.
	Local,
	/// Shared distributed cache.
	Distributed,
	/// Fresh remote issuance.
	Remote,
}
impl TokenSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenSource::Local => "local",
			TokenSource::Distributed => "distributed",
			TokenSource::Remote => "remote",
		}
	}
}
impl Display for TokenSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

type Slot = AsyncMutex<Option<TokenLease>>;

/// Backend and front credentials for one application.
pub struct TokenStore {
	app_id: AppId,
	cache: Arc<dyn DistributedCache>,
	issuer: Arc<dyn RemoteIssuer>,
	backend: Slot,
	front: Slot,
	metrics: Arc<AcquisitionMetrics>,
}
impl TokenStore {
	/// Creates an empty store; nothing is fetched until the first [`TokenStore::get`].
	pub fn new(
		app_id: AppId,
		cache: Arc<dyn DistributedCache>,
		issuer: Arc<dyn RemoteIssuer>,
	) -> Self {
		Self {
			app_id,
			cache,
			issuer,
			backend: AsyncMutex::new(None),
			front: AsyncMutex::new(None),
			metrics: Default::default(),
		}
	}

	/// Application the credentials belong to.
	pub fn app_id(&self) -> &AppId {
		&self.app_id
	}

	/// Acquisition counters for this store.
	pub fn metrics(&self) -> Arc<AcquisitionMetrics> {
		self.metrics.clone()
	}

	/// Returns a live `kind` credential, acquiring one when the local record is empty.
	///
	/// Cache read failures, transport failures, and envelope errors are returned unchanged and
	/// leave the store untouched; the next call starts over.
	pub async fn get(&self, kind: CredentialKind) -> Result<Token> {
		FlowSpan::token(kind, "get")
			.instrument(async move {
				let mut slot = self.slot(kind).lock().await;

				if let Some(token) = slot.as_ref().and_then(TokenLease::snapshot) {
					self.record(kind, TokenSource::Local, token.remaining_seconds);

					return Ok(token);
				}
				if let Some(expired) = slot.take() {
					expired.shutdown().await;
				}

				let (source, value, ttl) = match self.acquire(kind).await {
					Ok(acquired) => acquired,
					Err(e) => {
						self.metrics.record_failure();
						obs::log_token_failure(kind, &self.app_id, &e);

						return Err(e);
					},
				};

				*slot = Some(TokenLease::start(kind, value.clone(), ttl));

				self.record(kind, source, ttl);

				Ok(Token { kind, value, remaining_seconds: ttl })
			})
			.await
	}

	/// Discards the local `kind` record and stops its countdown.
	///
	/// The distributed cache is left alone, so the next [`TokenStore::get`] may rehydrate from it.
	pub async fn clear(&self, kind: CredentialKind) {
		let lease = self.slot(kind).lock().await.take();

		if let Some(lease) = lease {
			lease.shutdown().await;
		}
	}

	/// Returns the local `kind` record without acquiring one.
	pub async fn peek(&self, kind: CredentialKind) -> Option<Token> {
		self.slot(kind).lock().await.as_ref().and_then(TokenLease::snapshot)
	}

	fn slot(&self, kind: CredentialKind) -> &Slot {
		match kind {
			CredentialKind::Backend => &self.backend,
			CredentialKind::Front => &self.front,
		}
	}

	async fn acquire(&self, kind: CredentialKind) -> Result<(TokenSource, TokenSecret, u64)> {
		let key = kind.cache_key(&self.app_id);

		if let Some(value) = self.cache.get(&key).await?.filter(|value| !value.is_empty()) {
			let ttl = self.cache.ttl(&key).await?;

			if ttl > 0 {
				return Ok((TokenSource::Distributed, TokenSecret::new(value), ttl));
			}
		}

		let issued = self.issuer.fetch(kind, &self.app_id).await?;

		if !issuer::in_range(issued.expires_in) {
			return Err(UnmarshalError::Expiry { raw: issued.expires_in.to_string() }.into());
		}

		if let Err(e) = self.cache.set(&key, issued.value.expose(), issued.expires_in).await {
			obs::log_cache_write_failed(kind, &self.app_id, &e);
		}

		Ok((TokenSource::Remote, issued.value, issued.expires_in))
	}

	fn record(&self, kind: CredentialKind, source: TokenSource, remaining_seconds: u64) {
		self.metrics.record_source(source);
		obs::record_acquisition(kind, source);
		obs::log_token_acquired(kind, &self.app_id, source, remaining_seconds);
	}
}
impl Debug for TokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenStore")
			.field("app_id", &self.app_id)
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};
	// self
	use super::*;
	use crate::{
		cache::MemoryCache,
		issuer::{IssuedToken, IssuerFuture},
	};

	#[derive(Default)]
	struct FailingIssuer {
		calls: AtomicUsize,
	}
	impl RemoteIssuer for FailingIssuer {
		fn fetch<'a>(&'a self, _: CredentialKind, _: &'a AppId) -> IssuerFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { Err(Error::Code { code: "13".into(), message: "denied".into() }) })
		}
	}

	struct FixedIssuer;
	impl RemoteIssuer for FixedIssuer {
		fn fetch<'a>(&'a self, kind: CredentialKind, _: &'a AppId) -> IssuerFuture<'a> {
			Box::pin(async move {
				Ok(IssuedToken { value: TokenSecret::new(format!("{kind}-1")), expires_in: 30 })
			})
		}
	}

	fn app() -> AppId {
		AppId::new("app-1").expect("App id fixture should be valid.")
	}

	#[tokio::test(start_paused = true)]
	async fn failed_acquisition_leaves_store_empty() {
		let issuer = Arc::new(FailingIssuer::default());
		let store = TokenStore::new(app(), Arc::new(MemoryCache::default()), issuer.clone());
		let err = store.get(CredentialKind::Backend).await.expect_err("Issuance should fail.");

		assert_eq!(err.to_string(), "(13)denied");
		assert!(store.peek(CredentialKind::Backend).await.is_none());

		store.get(CredentialKind::Backend).await.expect_err("Retry should reach the issuer again.");

		assert_eq!(issuer.calls.load(Ordering::SeqCst), 2);
		assert_eq!(store.metrics().failures(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn kinds_are_tracked_independently() {
		let store = TokenStore::new(app(), Arc::new(MemoryCache::default()), Arc::new(FixedIssuer));
		let backend = store.get(CredentialKind::Backend).await.expect("Backend fetch should work.");
		let front = store.get(CredentialKind::Front).await.expect("Front fetch should work.");

		assert_eq!(backend.expose(), "backend-1");
		assert_eq!(front.expose(), "front-1");

		store.clear(CredentialKind::Backend).await;

		assert!(store.peek(CredentialKind::Backend).await.is_none());
		assert!(store.peek(CredentialKind::Front).await.is_some());
	}

	#[tokio::test(start_paused = true)]
	async fn cleared_record_rehydrates_from_distributed_cache() {
		let cache = Arc::new(MemoryCache::default());
		let store = TokenStore::new(app(), cache, Arc::new(FixedIssuer));

		store.get(CredentialKind::Front).await.expect("Initial fetch should work.");
		tokio::time::sleep(Duration::from_secs(10)).await;
		store.clear(CredentialKind::Front).await;

		let token = store.get(CredentialKind::Front).await.expect("Rehydration should work.");
		let metrics = store.metrics();

		assert_eq!(token.remaining_seconds, 20);
		assert_eq!(metrics.remote_fetches(), 1);
		assert_eq!(metrics.distributed_hits(), 1);
	}
}

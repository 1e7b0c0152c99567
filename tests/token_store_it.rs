// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use color_eyre::Result as EyreResult;
// self
use upapi_broker::{
	auth::{AppId, CredentialKind, TokenSecret},
	cache::{CacheError, CacheFuture, DistributedCache, MemoryCache},
	error::{Error, UnmarshalError},
	issuer::{IssuedToken, IssuerFuture, RemoteIssuer},
	store::TokenStore,
};

/// Issues `<kind>-<n>` after a short delay and counts calls.
struct CountingIssuer {
	calls: AtomicUsize,
	expires_in: u64,
	delay: Duration,
}
impl CountingIssuer {
	fn new(expires_in: u64) -> Arc<Self> {
		Arc::new(Self { calls: AtomicUsize::new(0), expires_in, delay: Duration::from_millis(50) })
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl RemoteIssuer for CountingIssuer {
	fn fetch<'a>(&'a self, kind: CredentialKind, _: &'a AppId) -> IssuerFuture<'a> {
		Box::pin(async move {
			let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

			tokio::time::sleep(self.delay).await;

			Ok(IssuedToken {
				value: TokenSecret::new(format!("{kind}-{n}")),
				expires_in: self.expires_in,
			})
		})
	}
}

/// Cache whose reads or writes fail on demand; reads otherwise return a fixed entry.
struct ScriptedCache {
	entry: Option<(String, u64)>,
	fail_reads: bool,
	fail_writes: bool,
}
impl DistributedCache for ScriptedCache {
	fn get<'a>(&'a self, _: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move {
			if self.fail_reads {
				return Err(CacheError::Connection { message: "cache offline".into() });
			}

			Ok(self.entry.as_ref().map(|(value, _)| value.clone()))
		})
	}

	fn ttl<'a>(&'a self, _: &'a str) -> CacheFuture<'a, u64> {
		Box::pin(async move { Ok(self.entry.as_ref().map(|(_, ttl)| *ttl).unwrap_or(0)) })
	}

	fn set<'a>(&'a self, _: &'a str, _: &'a str, _: u64) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			if self.fail_writes {
				Err(CacheError::Backend { message: "read-only replica".into() })
			} else {
				Ok(())
			}
		})
	}
}

fn app() -> AppId {
	AppId::new("19d8405c3c3e452ab43d68ce2aa305d3").expect("App id fixture should be valid.")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cold_gets_issue_once() -> EyreResult<()> {
	let issuer = CountingIssuer::new(7200);
	let store = Arc::new(TokenStore::new(app(), Arc::new(MemoryCache::default()), issuer.clone()));
	let handles = (0..16)
		.map(|_| {
			let store = store.clone();

			tokio::spawn(async move { store.get(CredentialKind::Backend).await })
		})
		.collect::<Vec<_>>();
	let mut values = Vec::new();

	for handle in handles {
		values.push(handle.await??.expose().to_owned());
	}

	assert_eq!(issuer.calls(), 1);
	assert!(values.iter().all(|value| value == "backend-1"));

	let metrics = store.metrics();

	assert_eq!(metrics.remote_fetches(), 1);
	assert_eq!(metrics.local_hits(), 15);

	Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn warm_gets_perform_no_io() -> EyreResult<()> {
	let issuer = CountingIssuer::new(7200);
	let store = Arc::new(TokenStore::new(app(), Arc::new(MemoryCache::default()), issuer.clone()));
	let first = store.get(CredentialKind::Front).await?;
	let (a, b, c) = tokio::join!(
		store.get(CredentialKind::Front),
		store.get(CredentialKind::Front),
		store.get(CredentialKind::Front),
	);

	assert_eq!(a?.value, first.value);
	assert_eq!(b?.value, first.value);
	assert_eq!(c?.value, first.value);
	assert_eq!(issuer.calls(), 1);
	assert_eq!(store.metrics().local_hits(), 3);

	Ok(())
}

#[tokio::test]
async fn distributed_entry_rehydrates_without_issuance() -> EyreResult<()> {
	let issuer = CountingIssuer::new(7200);
	let cache = Arc::new(MemoryCache::default());

	cache.set(&CredentialKind::Backend.cache_key(&app()), "shared-bt", 120).await?;

	let store = TokenStore::new(app(), cache, issuer.clone());
	let token = store.get(CredentialKind::Backend).await?;

	assert_eq!(token.expose(), "shared-bt");
	assert_eq!(token.remaining_seconds, 120);
	assert_eq!(issuer.calls(), 0);
	assert_eq!(store.metrics().distributed_hits(), 1);
	assert!(store.peek(CredentialKind::Backend).await.is_some());

	Ok(())
}

#[tokio::test]
async fn entry_without_expiry_is_treated_as_missing() -> EyreResult<()> {
	let issuer = CountingIssuer::new(60);
	let cache = Arc::new(ScriptedCache {
		entry: Some(("stale".into(), 0)),
		fail_reads: false,
		fail_writes: false,
	});
	let store = TokenStore::new(app(), cache, issuer.clone());
	let token = store.get(CredentialKind::Backend).await?;

	assert_eq!(token.expose(), "backend-1");
	assert_eq!(issuer.calls(), 1);

	Ok(())
}

#[tokio::test(start_paused = true)]
async fn expired_record_triggers_a_fresh_acquisition() -> EyreResult<()> {
	let issuer = CountingIssuer::new(2);
	let store = TokenStore::new(app(), Arc::new(MemoryCache::default()), issuer.clone());
	let first = store.get(CredentialKind::Backend).await?;

	assert_eq!(first.expose(), "backend-1");

	for _ in 0..6 {
		tokio::time::sleep(Duration::from_millis(500)).await;

		if let Some(token) = store.peek(CredentialKind::Backend).await {
			assert!(token.remaining_seconds > 0);
			assert!(!token.value.is_empty());
		}
	}

	assert!(store.peek(CredentialKind::Backend).await.is_none());

	let second = store.get(CredentialKind::Backend).await?;

	assert_eq!(second.expose(), "backend-2");
	assert_eq!(issuer.calls(), 2);

	Ok(())
}

#[tokio::test]
async fn cache_read_failures_propagate_without_issuance() {
	let issuer = CountingIssuer::new(60);
	let cache = Arc::new(ScriptedCache { entry: None, fail_reads: true, fail_writes: false });
	let store = TokenStore::new(app(), cache, issuer.clone());
	let err = store.get(CredentialKind::Front).await.expect_err("Cache outage should fail.");

	assert!(matches!(err, Error::Cache(CacheError::Connection { .. })));
	assert_eq!(issuer.calls(), 0);
	assert_eq!(store.metrics().failures(), 1);
}

#[tokio::test]
async fn cache_write_failures_do_not_fail_acquisition() -> EyreResult<()> {
	let issuer = CountingIssuer::new(60);
	let cache = Arc::new(ScriptedCache { entry: None, fail_reads: false, fail_writes: true });
	let store = TokenStore::new(app(), cache, issuer.clone());
	let token = store.get(CredentialKind::Front).await?;

	assert_eq!(token.expose(), "front-1");
	assert_eq!(token.remaining_seconds, 60);

	Ok(())
}

#[tokio::test]
async fn clear_forces_the_next_get_past_the_local_record() -> EyreResult<()> {
	let issuer = CountingIssuer::new(60);
	let cache = Arc::new(ScriptedCache { entry: None, fail_reads: false, fail_writes: false });
	let store = TokenStore::new(app(), cache, issuer.clone());

	store.get(CredentialKind::Backend).await?;
	store.clear(CredentialKind::Backend).await;

	assert!(store.peek(CredentialKind::Backend).await.is_none());

	let token = store.get(CredentialKind::Backend).await?;

	assert_eq!(token.expose(), "backend-2");

	Ok(())
}

#[tokio::test]
async fn unbounded_issued_lifetime_is_rejected_before_caching() {
	let issuer = CountingIssuer::new(u64::MAX);
	let cache = Arc::new(MemoryCache::default());
	let store = TokenStore::new(app(), cache.clone(), issuer.clone());
	let err = store.get(CredentialKind::Backend).await.expect_err("Unbounded lifetime should fail.");

	assert!(matches!(err, Error::Unmarshal(UnmarshalError::Expiry { .. })));
	assert_eq!(err.error_code(), "3105");
	assert!(cache.is_empty());
	assert!(store.peek(CredentialKind::Backend).await.is_none());
	assert_eq!(store.metrics().failures(), 1);
	assert_eq!(issuer.calls(), 1);
}

//! UnionPay App open-platform client: cached backend/front credentials shared through a
//! distributed cache, signed issuance, and typed operations dispatched through one envelope.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod accounts;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod issuer;
pub mod obs;
pub mod ops;
pub mod sign;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		cache::{DistributedCache, MemoryCache},
		client::AppClient,
		config::{AppConfig, IssuanceMode},
		http::ReqwestHttpClient,
	};

	/// Application id used by integration fixtures.
	pub const TEST_APP_ID: &str = "19d8405c3c3e452ab43d68ce2aa305d3";
	/// Shared secret used by integration fixtures.
	pub const TEST_SECRET: &str = "22ce65cacc7147189c849ab8ae8ad62a";
	/// 3DES key (hex) used by integration fixtures.
	pub const TEST_ENCRYPT_KEY: &str = "2ab34a731cae9d7629d3868f16e9e3c72ab34a731cae9d76";
	/// Plan id used by integration fixtures.
	pub const TEST_PLAN_ID: &str = "9b56b70f48ac43e09980916d67abbee5";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a signed-issuance config whose API base points at `api_base`.
	pub fn test_config(api_base: &str) -> AppConfig {
		let base = Url::parse(api_base).expect("Mock API base should parse successfully.");

		AppConfig::builder(TEST_APP_ID, TEST_SECRET, TEST_ENCRYPT_KEY)
			.plan_id(TEST_PLAN_ID)
			.api_base(base)
			.issuance(IssuanceMode::default())
			.build()
			.expect("Test config should pass validation.")
	}

	/// Constructs an [`AppClient`] backed by an in-memory cache and the reqwest transport used
	/// across integration tests.
	pub fn build_test_client(config: AppConfig) -> (AppClient, Arc<MemoryCache>) {
		let cache_backend = Arc::new(MemoryCache::default());
		let cache: Arc<dyn DistributedCache> = cache_backend.clone();
		let client =
			AppClient::with_http_client(config, cache, Arc::new(test_reqwest_http_client()))
				.expect("Test client should build from a validated config.");

		(client, cache_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

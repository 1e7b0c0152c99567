//! Per-application facade tying configuration, credentials, and dispatch together.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, Token},
	cache::DistributedCache,
	config::{AppConfig, IssuanceMode},
	dispatch::{Dispatcher, OperationTable},
	http::ApiHttpClient,
	issuer::{BasicAuthIssuer, RemoteIssuer, SignedIssuer},
	sign::Signer,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Client for one platform application.
///
/// Cheap to share behind an [`Arc`]; every method takes `&self`. The credential records and the
/// operation table live as long as the client, and concurrent callers share one acquisition per
/// credential kind.
#[derive(Clone)]
pub struct AppClient {
	config: Arc<AppConfig>,
	tokens: Arc<TokenStore>,
	dispatcher: Dispatcher,
}
impl AppClient {
	/// Creates a client over the caller-provided transport with the built-in operation table.
	pub fn with_http_client(
		config: AppConfig,
		cache: Arc<dyn DistributedCache>,
		http: Arc<dyn ApiHttpClient>,
	) -> Result<Self> {
		let operations = OperationTable::standard(&config.api_base)?;

		Self::with_operations(config, cache, http, operations)
	}

	/// Creates a client with a custom operation table.
	///
	/// The configuration is validated first; nothing touches the network until the first call.
	pub fn with_operations(
		config: AppConfig,
		cache: Arc<dyn DistributedCache>,
		http: Arc<dyn ApiHttpClient>,
		operations: OperationTable,
	) -> Result<Self> {
		config.validate()?;

		let issuer = issuer_for(&config, http.clone());
		let tokens = Arc::new(TokenStore::new(config.app_id.clone(), cache, issuer));
		let dispatcher = Dispatcher::new(http, tokens.clone(), Arc::new(operations));

		Ok(Self { config: Arc::new(config), tokens, dispatcher })
	}

	/// Validated configuration.
	pub fn config(&self) -> &AppConfig {
		&self.config
	}

	/// Credential store backing this client.
	pub fn tokens(&self) -> &Arc<TokenStore> {
		&self.tokens
	}

	/// Dispatcher for operations without a typed helper.
	pub fn dispatcher(&self) -> &Dispatcher {
		&self.dispatcher
	}

	/// Returns a live backend credential.
	pub async fn backend_token(&self) -> Result<Token> {
		self.tokens.get(CredentialKind::Backend).await
	}

	/// Returns a live front credential.
	pub async fn front_token(&self) -> Result<Token> {
		self.tokens.get(CredentialKind::Front).await
	}

	/// Drops the local backend credential, e.g. after the platform rejected it.
	pub async fn clear_backend_token(&self) {
		self.tokens.clear(CredentialKind::Backend).await;
	}

	/// Drops the local front credential.
	pub async fn clear_front_token(&self) {
		self.tokens.clear(CredentialKind::Front).await;
	}

	/// Calls a table-registered operation and decodes its payload into `T`.
	pub async fn request<T>(&self, name: &str, params: Map<String, Value>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.dispatcher.request(name, params).await
	}

	/// Calls a table-registered operation and returns its raw payload.
	pub async fn request_value(&self, name: &str, params: Map<String, Value>) -> Result<Value> {
		self.dispatcher.request_value(name, params).await
	}

	/// Seeds the parameter map every business call starts from.
	pub(crate) fn base_params(&self) -> Map<String, Value> {
		let mut params = Map::new();

		params.insert("appId".into(), Value::String(self.config.app_id.to_string()));

		params
	}
}
#[cfg(feature = "reqwest")]
impl AppClient {
	/// Creates a client with its own reqwest transport and the built-in operation table.
	pub fn new(config: AppConfig, cache: Arc<dyn DistributedCache>) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(crate::error::ConfigError::from)?;

		Self::with_http_client(config, cache, Arc::new(ReqwestHttpClient::with_client(client)))
	}
}
impl Debug for AppClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppClient")
			.field("config", &self.config)
			.field("dispatcher", &self.dispatcher)
			.finish()
	}
}

fn issuer_for(config: &AppConfig, http: Arc<dyn ApiHttpClient>) -> Arc<dyn RemoteIssuer> {
	match &config.issuance {
		IssuanceMode::Signed { expires_in_override } => Arc::new(
			SignedIssuer::new(
				http,
				Signer::new(config.secret.expose()),
				config.api_base.clone(),
			)
			.with_expires_in_override(*expires_in_override),
		),
		IssuanceMode::BasicAuth { base_url, username, password, expires_in_override } => Arc::new(
			BasicAuthIssuer::new(
				http,
				base_url.clone(),
				username.as_str(),
				password.clone(),
				config.secret.clone(),
			)
			.with_expires_in_override(*expires_in_override),
		),
	}
}

//! Multi-application routing: resolve a client by app id, then delegate.

// self
use crate::{
	_prelude::*,
	auth::{AppId, Token},
	client::AppClient,
	ops::{
		ContractApply, ContractApplyRequest, ContractCodeRequest, ContractInfo,
		ContractInfoRequest, ContractRelieve, ContractRelieveRequest, JsApiConfig, OAuthCodeRequest,
		OAuthMobile, OAuthMobileRequest, OAuthToken, PushMessageRequest,
	},
};

/// Boxed future returned by [`AccountDirectory::account`].
pub type AccountFuture<'a> = Pin<Box<dyn Future<Output = Result<Arc<AppClient>>> + 'a + Send>>;

/// Source of per-application clients, e.g. a database-backed registry.
pub trait AccountDirectory
where
	Self: Send + Sync,
{
	/// Resolves the client configured for `app_id`.
	fn account<'a>(&'a self, app_id: &'a AppId) -> AccountFuture<'a>;
}
impl AccountDirectory for HashMap<AppId, Arc<AppClient>> {
	fn account<'a>(&'a self, app_id: &'a AppId) -> AccountFuture<'a> {
		Box::pin(async move {
			self.get(app_id)
				.cloned()
				.ok_or_else(|| Error::param(format!("no account is registered for `{app_id}`")))
		})
	}
}

/// Routes every client operation through an [`AccountDirectory`].
#[derive(Clone, Debug)]
pub struct Accounts<D> {
	directory: D,
}
impl<D> Accounts<D>
where
	D: AccountDirectory,
{
	/// Wraps `directory`.
	pub fn new(directory: D) -> Self {
		Self { directory }
	}

	/// Underlying directory.
	pub fn directory(&self) -> &D {
		&self.directory
	}

	/// See [`AppClient::backend_token`].
	pub async fn backend_token(&self, app_id: &AppId) -> Result<Token> {
		self.directory.account(app_id).await?.backend_token().await
	}

	/// See [`AppClient::front_token`].
	pub async fn front_token(&self, app_id: &AppId) -> Result<Token> {
		self.directory.account(app_id).await?.front_token().await
	}

	/// See [`AppClient::js_api_config`].
	pub async fn js_api_config(&self, app_id: &AppId, url: &str) -> Result<JsApiConfig> {
		self.directory.account(app_id).await?.js_api_config(url).await
	}

	/// See [`AppClient::oauth_code_url`].
	pub async fn oauth_code_url(&self, app_id: &AppId, request: &OAuthCodeRequest) -> Result<Url> {
		self.directory.account(app_id).await?.oauth_code_url(request)
	}

	/// See [`AppClient::oauth_token`].
	pub async fn oauth_token(&self, app_id: &AppId, code: &str) -> Result<OAuthToken> {
		self.directory.account(app_id).await?.oauth_token(code).await
	}

	/// See [`AppClient::oauth_mobile`].
	pub async fn oauth_mobile(
		&self,
		app_id: &AppId,
		request: &OAuthMobileRequest,
	) -> Result<OAuthMobile> {
		self.directory.account(app_id).await?.oauth_mobile(request).await
	}

	/// See [`AppClient::oauth_mobile_from_code`].
	pub async fn oauth_mobile_from_code(&self, app_id: &AppId, code: &str) -> Result<OAuthMobile> {
		self.directory.account(app_id).await?.oauth_mobile_from_code(code).await
	}

	/// See [`AppClient::contract_code_url`].
	pub async fn contract_code_url(
		&self,
		app_id: &AppId,
		request: &ContractCodeRequest,
	) -> Result<Url> {
		self.directory.account(app_id).await?.contract_code_url(request)
	}

	/// See [`AppClient::contract_apply`].
	pub async fn contract_apply(
		&self,
		app_id: &AppId,
		request: &ContractApplyRequest,
	) -> Result<ContractApply> {
		self.directory.account(app_id).await?.contract_apply(request).await
	}

	/// See [`AppClient::contract_relieve`].
	pub async fn contract_relieve(
		&self,
		app_id: &AppId,
		request: &ContractRelieveRequest,
	) -> Result<ContractRelieve> {
		self.directory.account(app_id).await?.contract_relieve(request).await
	}

	/// See [`AppClient::contract_info`].
	pub async fn contract_info(
		&self,
		app_id: &AppId,
		request: &ContractInfoRequest,
	) -> Result<ContractInfo> {
		self.directory.account(app_id).await?.contract_info(request).await
	}

	/// See [`AppClient::push_message`].
	pub async fn push_message(
		&self,
		app_id: &AppId,
		request: &PushMessageRequest,
	) -> Result<Map<String, Value>> {
		self.directory.account(app_id).await?.push_message(request).await
	}
}

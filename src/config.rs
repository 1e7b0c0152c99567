//! Application configuration, validated once before a client becomes usable.
//!
//! [`AppConfig`] deserializes from camelCase documents (any serde format the host loads) or is
//! assembled with [`AppConfig::builder`]. Either way [`AppConfig::validate`] runs before the
//! client is constructed, so missing fields or malformed key material fail fast.

// self
use crate::{
	_prelude::*,
	auth::{AppId, PlanId, TokenSecret},
	error::ConfigError,
	issuer::MAX_EXPIRES_IN,
};

/// Default base URL for business operations and signed issuance.
pub const DEFAULT_API_BASE: &str = "https://open.95516.com/open/access/1.0/";
/// Default base URL for user-facing OAuth and contract pages.
pub const DEFAULT_PORTAL_BASE: &str = "https://open.95516.com/s/open/";

/// How credentials are minted when neither cache holds one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IssuanceMode {
	/// Signed POST to `<apiBase>backendToken|frontToken` with the platform envelope.
	Signed {
		/// Replaces the platform-reported expiry when set.
		#[serde(default)]
		expires_in_override: Option<u64>,
	},
	/// Basic-auth POST to a credential relay with the `code/message/data` envelope.
	BasicAuth {
		/// Relay base URL; issuance paths are joined onto it.
		base_url: Url,
		/// Basic-auth user name.
		username: String,
		/// Basic-auth password.
		password: TokenSecret,
		/// Replaces the relay-reported expiry when set.
		#[serde(default)]
		expires_in_override: Option<u64>,
	},
}
impl IssuanceMode {
	/// Returns the configured expiry override, if any.
	pub fn expires_in_override(&self) -> Option<u64> {
		match self {
			Self::Signed { expires_in_override } | Self::BasicAuth { expires_in_override, .. } =>
				*expires_in_override,
		}
	}
}
impl Default for IssuanceMode {
	fn default() -> Self {
		Self::Signed { expires_in_override: None }
	}
}
impl Debug for IssuanceMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Signed { expires_in_override } => f
				.debug_struct("IssuanceMode::Signed")
				.field("expires_in_override", expires_in_override)
				.finish(),
			Self::BasicAuth { base_url, username, expires_in_override, .. } => f
				.debug_struct("IssuanceMode::BasicAuth")
				.field("base_url", &base_url.as_str())
				.field("username", username)
				.field("password", &"<redacted>")
				.field("expires_in_override", expires_in_override)
				.finish(),
		}
	}
}

/// Immutable application configuration consumed by [`crate::client::AppClient`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	/// Application identity; keys every cached credential.
	pub app_id: AppId,
	/// Shared secret used in issuance signatures.
	pub secret: TokenSecret,
	/// Hex-encoded 3DES key for encrypted user fields.
	pub encrypt_key: TokenSecret,
	/// Contract plan, required by contract operations.
	#[serde(default)]
	pub plan_id: Option<PlanId>,
	/// Prefix prepended to caller redirect URIs on OAuth and contract pages.
	#[serde(default)]
	pub oauth_redirect_uri: Option<String>,
	/// Base URL for business operations and signed issuance.
	#[serde(default = "default_api_base")]
	pub api_base: Url,
	/// Base URL for user-facing OAuth and contract pages.
	#[serde(default = "default_portal_base")]
	pub portal_base: Url,
	/// Credential issuance mode.
	#[serde(default)]
	pub issuance: IssuanceMode,
}
impl AppConfig {
	/// Returns a builder seeded with the three required fields.
	pub fn builder(
		app_id: impl Into<String>,
		secret: impl Into<String>,
		encrypt_key: impl Into<String>,
	) -> AppConfigBuilder {
		AppConfigBuilder::new(app_id, secret, encrypt_key)
	}

	/// Checks every invariant the client relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.secret.is_empty() {
			return Err(ConfigError::MissingField { field: "secret" });
		}
		if self.encrypt_key.is_empty() {
			return Err(ConfigError::MissingField { field: "encryptKey" });
		}

		self.encrypt_key_bytes()?;

		validate_base("apiBase", &self.api_base)?;
		validate_base("portalBase", &self.portal_base)?;

		let override_secs = self.issuance.expires_in_override();

		if let Some(value) = override_secs.filter(|value| *value > MAX_EXPIRES_IN) {
			return Err(ConfigError::ExpiresInOverride { value, max: MAX_EXPIRES_IN });
		}

		if let IssuanceMode::BasicAuth { base_url, username, password, .. } = &self.issuance {
			validate_base("issuance.baseUrl", base_url)?;

			if username.is_empty() {
				return Err(ConfigError::MissingField { field: "issuance.username" });
			}
			if password.is_empty() {
				return Err(ConfigError::MissingField { field: "issuance.password" });
			}
		}

		Ok(())
	}

	/// Decodes the hex encryption key.
	pub fn encrypt_key_bytes(&self) -> Result<Vec<u8>, ConfigError> {
		hex::decode(self.encrypt_key.expose())
			.map_err(|source| ConfigError::InvalidEncryptKey { source })
	}

	/// Joins `path` onto the API base.
	pub fn api_url(&self, path: &str) -> Result<Url, ConfigError> {
		join(&self.api_base, path)
	}

	/// Joins `path` onto the portal base.
	pub fn portal_url(&self, path: &str) -> Result<Url, ConfigError> {
		join(&self.portal_base, path)
	}

	/// Prefixes `uri` with the configured OAuth redirect, when present.
	pub fn redirect_uri(&self, uri: &str) -> String {
		match &self.oauth_redirect_uri {
			Some(prefix) => format!("{prefix}{uri}"),
			None => uri.to_owned(),
		}
	}
}
impl Debug for AppConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppConfig")
			.field("app_id", &self.app_id)
			.field("secret", &self.secret)
			.field("encrypt_key", &self.encrypt_key)
			.field("plan_id", &self.plan_id)
			.field("oauth_redirect_uri", &self.oauth_redirect_uri)
			.field("api_base", &self.api_base.as_str())
			.field("portal_base", &self.portal_base.as_str())
			.field("issuance", &self.issuance)
			.finish()
	}
}

/// Builder for [`AppConfig`] values.
#[derive(Debug)]
pub struct AppConfigBuilder {
	app_id: String,
	secret: String,
	encrypt_key: String,
	plan_id: Option<String>,
	oauth_redirect_uri: Option<String>,
	api_base: Option<Url>,
	portal_base: Option<Url>,
	issuance: IssuanceMode,
}
impl AppConfigBuilder {
	fn new(
		app_id: impl Into<String>,
		secret: impl Into<String>,
		encrypt_key: impl Into<String>,
	) -> Self {
		Self {
			app_id: app_id.into(),
			secret: secret.into(),
			encrypt_key: encrypt_key.into(),
			plan_id: None,
			oauth_redirect_uri: None,
			api_base: None,
			portal_base: None,
			issuance: IssuanceMode::default(),
		}
	}

	/// Sets the contract plan.
	pub fn plan_id(mut self, plan_id: impl Into<String>) -> Self {
		self.plan_id = Some(plan_id.into());

		self
	}

	/// Sets the redirect prefix for OAuth and contract pages.
	pub fn oauth_redirect_uri(mut self, prefix: impl Into<String>) -> Self {
		self.oauth_redirect_uri = Some(prefix.into());

		self
	}

	/// Overrides the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Overrides the portal base URL.
	pub fn portal_base(mut self, url: Url) -> Self {
		self.portal_base = Some(url);

		self
	}

	/// Selects the issuance mode.
	pub fn issuance(mut self, issuance: IssuanceMode) -> Self {
		self.issuance = issuance;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<AppConfig, ConfigError> {
		if self.app_id.is_empty() {
			return Err(ConfigError::MissingField { field: "appId" });
		}

		let plan_id = self.plan_id.filter(|value| !value.is_empty()).map(PlanId::new).transpose()?;
		let config = AppConfig {
			app_id: AppId::new(&self.app_id)?,
			secret: TokenSecret::new(self.secret),
			encrypt_key: TokenSecret::new(self.encrypt_key),
			plan_id,
			oauth_redirect_uri: self.oauth_redirect_uri.filter(|value| !value.is_empty()),
			api_base: self.api_base.unwrap_or_else(default_api_base),
			portal_base: self.portal_base.unwrap_or_else(default_portal_base),
			issuance: self.issuance,
		};

		config.validate()?;

		Ok(config)
	}
}

fn default_api_base() -> Url {
	Url::parse(DEFAULT_API_BASE).unwrap_or_else(|_| unreachable!("constant URL parses"))
}

fn default_portal_base() -> Url {
	Url::parse(DEFAULT_PORTAL_BASE).unwrap_or_else(|_| unreachable!("constant URL parses"))
}

fn validate_base(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	let usable = matches!(url.scheme(), "http" | "https") && url.path().ends_with('/');

	if usable { Ok(()) } else { Err(ConfigError::InvalidBaseUrl { field, url: url.to_string() }) }
}

fn join(base: &Url, path: &str) -> Result<Url, ConfigError> {
	base.join(path).map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
}

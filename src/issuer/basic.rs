//! Relay issuance authenticated with HTTP basic auth.

// self
use crate::{
	_prelude::*,
	auth::{AppId, CredentialKind, TokenSecret},
	error::{ConfigError, UnmarshalError},
	http::{ApiHttpClient, ApiRequest},
	issuer::{IssuedToken, IssuerFuture, RemoteIssuer, SUCCESS_CODE},
	obs,
};

/// Relay envelope: `{code, message, data}`.
#[derive(Debug, Deserialize)]
struct RelayEnvelope {
	#[serde(default)]
	code: String,
	#[serde(default)]
	message: String,
	#[serde(default)]
	data: Option<Map<String, Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
	app_id: &'a str,
	secret: &'a str,
}

/// POSTs `{appId, secret}` with basic auth to `<base>backendToken|frontToken`.
#[derive(Clone)]
pub struct BasicAuthIssuer {
	http: Arc<dyn ApiHttpClient>,
	base: Url,
	username: String,
	password: TokenSecret,
	secret: TokenSecret,
	expires_in_override: Option<u64>,
}
impl BasicAuthIssuer {
	/// Creates an issuer for the relay at `base`.
	pub fn new(
		http: Arc<dyn ApiHttpClient>,
		base: Url,
		username: impl Into<String>,
		password: TokenSecret,
		secret: TokenSecret,
	) -> Self {
		Self {
			http,
			base,
			username: username.into(),
			password,
			secret,
			expires_in_override: None,
		}
	}

	/// Replaces the relay-reported expiry with a fixed lifetime.
	pub fn with_expires_in_override(mut self, expires_in: Option<u64>) -> Self {
		self.expires_in_override = expires_in;

		self
	}

	async fn fetch_now(&self, kind: CredentialKind, app_id: &AppId) -> Result<IssuedToken> {
		let path = kind.issue_path();
		let url = self.base.join(path).map_err(|source| ConfigError::InvalidEndpoint {
			path: path.to_owned(),
			source,
		})?;
		let body = RelayRequest { app_id: app_id.as_ref(), secret: self.secret.expose() };
		let request = ApiRequest::json(url, &body)?
			.with_basic_auth(self.username.as_str(), self.password.expose());
		let response = self.http.post_json(request).await?;

		obs::log_issuance_response(kind, app_id, response.status);

		let envelope: RelayEnvelope = UnmarshalError::decode_slice(path, &response.body)?;

		if envelope.code != SUCCESS_CODE {
			return Err(super::code_error(envelope.code, envelope.message, path));
		}

		let payload = envelope.data.unwrap_or_default();

		Ok(IssuedToken::from_payload(kind, &payload, self.expires_in_override)?)
	}
}
impl RemoteIssuer for BasicAuthIssuer {
	fn fetch<'a>(&'a self, kind: CredentialKind, app_id: &'a AppId) -> IssuerFuture<'a> {
		Box::pin(self.fetch_now(kind, app_id))
	}
}
impl Debug for BasicAuthIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicAuthIssuer")
			.field("base", &self.base.as_str())
			.field("username", &self.username)
			.field("password", &self.password)
			.field("expires_in_override", &self.expires_in_override)
			.finish()
	}
}

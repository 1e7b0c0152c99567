//! Direct platform issuance authenticated by a shared-secret signature.

// self
use crate::{
	_prelude::*,
	auth::{AppId, CredentialKind},
	error::{ConfigError, UnmarshalError},
	http::{ApiHttpClient, ApiRequest},
	issuer::{IssuedToken, IssuerFuture, RemoteIssuer, SUCCESS_CODE},
	obs,
	sign::Signer,
};

/// Platform envelope: `{resp, msg, params}`.
#[derive(Debug, Deserialize)]
struct PlatformEnvelope {
	#[serde(default)]
	resp: String,
	#[serde(default)]
	msg: String,
	#[serde(default)]
	params: Option<Map<String, Value>>,
}

/// POSTs `{appId, timestamp, nonceStr, signature}` to `<base>backendToken|frontToken`.
#[derive(Clone)]
pub struct SignedIssuer {
	http: Arc<dyn ApiHttpClient>,
	signer: Signer,
	base: Url,
	expires_in_override: Option<u64>,
}
impl SignedIssuer {
	/// Creates an issuer rooted at `base` that signs with `signer`.
	pub fn new(http: Arc<dyn ApiHttpClient>, signer: Signer, base: Url) -> Self {
		Self { http, signer, base, expires_in_override: None }
	}

	/// Replaces the platform-reported expiry with a fixed lifetime.
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
		let mut body = Map::new();

		body.insert("appId".into(), Value::String(app_id.to_string()));

		self.signer.sign(&mut body);

		let response = self.http.post_json(ApiRequest::json(url, &body)?).await?;

		obs::log_issuance_response(kind, app_id, response.status);

		let envelope: PlatformEnvelope = UnmarshalError::decode_slice(path, &response.body)?;

		if envelope.resp != SUCCESS_CODE {
			return Err(super::code_error(envelope.resp, envelope.msg, path));
		}

		let payload = envelope.params.unwrap_or_default();

		Ok(IssuedToken::from_payload(kind, &payload, self.expires_in_override)?)
	}
}
impl RemoteIssuer for SignedIssuer {
	fn fetch<'a>(&'a self, kind: CredentialKind, app_id: &'a AppId) -> IssuerFuture<'a> {
		Box::pin(self.fetch_now(kind, app_id))
	}
}
impl Debug for SignedIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignedIssuer")
			.field("base", &self.base.as_str())
			.field("expires_in_override", &self.expires_in_override)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		http::ScriptedHttp,
		sign::{self, SECRET_FIELD, SIGNATURE_FIELD},
	};

	#[tokio::test]
	async fn posts_signed_body_to_kind_path() {
		let http = Arc::new(ScriptedHttp::json(
			r#"{"resp":"00","msg":"","params":{"backendToken":"bt","expiresIn":60}}"#,
		));
		let base =
			Url::parse("https://open.example.com/open/access/1.0/").expect("Base should parse.");
		let issuer = SignedIssuer::new(http.clone(), Signer::new("s3cr3t"), base);
		let app = AppId::new("app-1").expect("App id fixture should be valid.");
		let issued =
			issuer.fetch(CredentialKind::Backend, &app).await.expect("Issuance should succeed.");

		assert_eq!(issued.value.expose(), "bt");
		assert_eq!(issued.expires_in, 60);
		assert_eq!(
			http.requests.lock()[0].url.as_str(),
			"https://open.example.com/open/access/1.0/backendToken",
		);

		let mut body = http.bodies().remove(0);
		let signature = body
			.remove(SIGNATURE_FIELD)
			.and_then(|value| value.as_str().map(ToOwned::to_owned))
			.expect("Body should carry a signature.");

		assert!(!body.contains_key(SECRET_FIELD));
		assert_eq!(body.get("appId").and_then(Value::as_str), Some("app-1"));

		body.insert(SECRET_FIELD.into(), Value::String("s3cr3t".into()));

		assert_eq!(sign::sha256_hex(&sign::canonical_string(&body)), signature);
	}

	#[tokio::test]
	async fn non_success_envelope_maps_to_code() {
		let http = Arc::new(ScriptedHttp::json(r#"{"resp":"01","msg":"","params":null}"#));
		let base = Url::parse("https://open.example.com/").expect("Base should parse.");
		let issuer = SignedIssuer::new(http, Signer::new("s3cr3t"), base);
		let app = AppId::new("app-1").expect("App id fixture should be valid.");
		let err = issuer
			.fetch(CredentialKind::Front, &app)
			.await
			.expect_err("Non-00 issuance should fail.");

		assert_eq!(err.to_string(), "(01)frontToken");
	}
}

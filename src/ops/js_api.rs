//! Signature block for the client-side JS widget.

// self
use crate::{
	_prelude::*,
	client::AppClient,
	ops::require,
	sign::{self, NONCE_FIELD, TIMESTAMP_FIELD},
};

const JS_NONCE_LEN: usize = 10;

/// Configuration embedded in a page to initialize the JS widget.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiConfig {
	/// Widget debug mode; always `false` when generated here.
	pub debug: bool,
	/// Application identity.
	pub app_id: String,
	/// Unix seconds at signing time.
	pub timestamp: i64,
	/// Random nonce.
	pub nonce_str: String,
	/// Lowercase hex SHA-256 signature.
	pub signature: String,
}
impl JsApiConfig {
	/// Signs `url` for `app_id` with a front credential at a fixed time and nonce.
	pub fn signed(
		app_id: &str,
		front_token: &str,
		url: &str,
		timestamp: i64,
		nonce_str: String,
	) -> Self {
		let mut fields = Map::new();

		fields.insert("appId".into(), Value::String(app_id.to_owned()));
		fields.insert("frontToken".into(), Value::String(front_token.to_owned()));
		fields.insert(NONCE_FIELD.into(), Value::String(nonce_str.clone()));
		fields.insert(TIMESTAMP_FIELD.into(), Value::String(timestamp.to_string()));
		fields.insert("url".into(), Value::String(url.to_owned()));

		let signature = sign::sha256_hex(&sign::canonical_string(&fields));

		Self { debug: false, app_id: app_id.to_owned(), timestamp, nonce_str, signature }
	}
}

impl AppClient {
	/// Signs `url` with the current front credential; only credential acquisition may hit the
	/// network.
	pub async fn js_api_config(&self, url: &str) -> Result<JsApiConfig> {
		require("url", url)?;

		let front = self.front_token().await?;

		Ok(JsApiConfig::signed(
			&self.config().app_id,
			front.expose(),
			url,
			sign::unix_timestamp(),
			sign::nonce(JS_NONCE_LEN),
		))
	}
}

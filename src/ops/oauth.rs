//! User authorization: consent page, code exchange, and mobile-number lookup.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	client::AppClient,
	dispatch::{OAUTH_MOBILE, OAUTH_TOKEN},
	error::UnmarshalError,
	ops::{insert_str, require},
};

/// Consent scope requested on the OAuth page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OAuthScope {
	/// Silent authorization yielding the user's `openId`.
	#[default]
	#[serde(rename = "upapi_base")]
	Base,
	/// Explicit authorization additionally granting the mobile number.
	#[serde(rename = "upapi_mobile")]
	Mobile,
}
impl OAuthScope {
	/// Returns the platform scope string.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Base => "upapi_base",
			Self::Mobile => "upapi_mobile",
		}
	}
}
impl Display for OAuthScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Input for [`AppClient::oauth_code_url`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCodeRequest {
	/// Redirect target; prefixed with the configured OAuth redirect.
	pub uri: String,
	/// Requested consent scope.
	pub scope: OAuthScope,
	/// Opaque state echoed back on redirect.
	pub state: String,
}

/// User credential returned by [`AppClient::oauth_token`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OAuthToken {
	/// User access token.
	pub access_token: String,
	/// Access token lifetime in seconds.
	pub expires_in: i64,
	/// Refresh token.
	pub refresh_token: String,
	/// User identifier.
	pub open_id: String,
	/// Granted scope.
	pub scope: String,
}
impl Debug for OAuthToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthToken")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("refresh_token", &"<redacted>")
			.field("open_id", &self.open_id)
			.field("scope", &self.scope)
			.finish()
	}
}

/// Input for [`AppClient::oauth_mobile`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthMobileRequest {
	/// User identifier.
	pub open_id: String,
	/// User access token with the mobile scope.
	pub access_token: String,
}

/// Mobile number as returned by the platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthMobile {
	/// Base64 of the 3DES-encrypted number.
	pub mobile: String,
}
impl OAuthMobile {
	/// Decodes the base64 envelope into raw ciphertext for the application's 3DES key.
	pub fn ciphertext(&self) -> Result<Vec<u8>> {
		STANDARD
			.decode(self.mobile.as_bytes())
			.map_err(|source| UnmarshalError::Encoding { field: "mobile", source }.into())
	}
}

impl AppClient {
	/// URL of the consent page that redirects back with an authorization code.
	pub fn oauth_code_url(&self, request: &OAuthCodeRequest) -> Result<Url> {
		let redirect_uri = self.config().redirect_uri(&request.uri);

		self.portal_page(
			"html/oauth.html",
			&[
				("appId", self.config().app_id.as_ref()),
				("redirectUri", redirect_uri.as_str()),
				("responseType", "code"),
				("scope", request.scope.as_str()),
				("state", request.state.as_str()),
			],
		)
	}

	/// Exchanges an authorization code for a user credential.
	pub async fn oauth_token(&self, code: &str) -> Result<OAuthToken> {
		require("code", code)?;

		let mut params = self.base_params();

		insert_str(&mut params, "code", code);
		insert_str(&mut params, "grantType", "authorization_code");

		self.request(OAUTH_TOKEN, params).await
	}

	/// Fetches the user's encrypted mobile number.
	pub async fn oauth_mobile(&self, request: &OAuthMobileRequest) -> Result<OAuthMobile> {
		require("openId", &request.open_id)?;

		let mut params = self.base_params();

		insert_str(&mut params, "accessToken", &request.access_token);
		insert_str(&mut params, "openId", &request.open_id);

		let mobile: OAuthMobile = self.request(OAUTH_MOBILE, params).await?;

		// Malformed ciphertext is reported here rather than on first use.
		mobile.ciphertext()?;

		Ok(mobile)
	}

	/// Exchanges `code` and immediately fetches the mobile number it grants.
	pub async fn oauth_mobile_from_code(&self, code: &str) -> Result<OAuthMobile> {
		let token = self.oauth_token(code).await?;

		self.oauth_mobile(&OAuthMobileRequest {
			open_id: token.open_id,
			access_token: token.access_token,
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scope_serializes_as_platform_string() {
		assert_eq!(
			serde_json::to_string(&OAuthScope::Mobile).expect("Scope should serialize."),
			"\"upapi_mobile\"",
		);
		assert_eq!(OAuthScope::default().as_str(), "upapi_base");
	}

	#[test]
	fn ciphertext_decodes_base64() {
		let mobile = OAuthMobile { mobile: "AAECAw==".into() };

		assert_eq!(mobile.ciphertext().ok(), Some(vec![0, 1, 2, 3]));

		let err = OAuthMobile { mobile: "not base64!".into() }
			.ciphertext()
			.expect_err("Invalid base64 should be rejected.");

		assert_eq!(err.error_code(), "3105");
	}

	#[test]
	fn token_debug_redacts_credentials() {
		let token = OAuthToken {
			access_token: "at-secret".into(),
			refresh_token: "rt-secret".into(),
			..Default::default()
		};
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("at-secret"));
		assert!(!rendered.contains("rt-secret"));
	}
}

//! Transport primitives for platform calls.
//!
//! The client only ever POSTs JSON bodies, optionally with HTTP basic auth, and reads the raw
//! response body back. [`ApiHttpClient`] is the crate's only dependency on an HTTP stack, so
//! downstream crates can plug in their own transport (or a fake in tests) while the
//! [`ReqwestHttpClient`] wrapper covers the default deployment.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`ApiHttpClient::post_json`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// HTTP transport capable of POSTing JSON bodies to platform endpoints.
///
/// Implementations must not treat non-2xx statuses as errors; the platform reports failures in
/// the response envelope, which callers parse regardless of the HTTP status.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the raw response.
	fn post_json(&self, request: ApiRequest) -> HttpFuture<'_>;
}

/// HTTP basic credentials attached to a request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
	/// User name.
	pub username: String,
	/// Password; redacted in `Debug`.
	pub password: String,
}
impl Debug for BasicAuth {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BasicAuth")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Outbound JSON POST.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// Absolute endpoint URL.
	pub url: Url,
	/// Serialized JSON body.
	pub body: Vec<u8>,
	/// Optional basic-auth credentials.
	pub basic_auth: Option<BasicAuth>,
}
impl ApiRequest {
	/// Serializes `body` as JSON for a POST to `url`.
	pub fn json(url: Url, body: &impl Serialize) -> Result<Self, TransportError> {
		let body = serde_json::to_vec(body).map_err(TransportError::network)?;

		Ok(Self { url, body, basic_auth: None })
	}

	/// Attaches HTTP basic credentials.
	pub fn with_basic_auth(
		mut self,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		self.basic_auth = Some(BasicAuth { username: username.into(), password: password.into() });

		self
	}
}

/// Raw response returned by the transport.
#[derive(Clone, Debug, Default)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Body as UTF-8 text, replacing invalid sequences; used for logging.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn post_json(&self, request: ApiRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client
				.post(request.url)
				.header(reqwest::header::CONTENT_TYPE, "application/json")
				.body(request.body);

			if let Some(auth) = request.basic_auth {
				builder = builder.basic_auth(auth.username, Some(auth.password));
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, body })
		})
	}
}

/// Scripted transport that records every request and answers from a closure.
#[cfg(test)]
pub(crate) struct ScriptedHttp {
	pub(crate) requests: Mutex<Vec<ApiRequest>>,
	reply: Box<dyn Fn(&ApiRequest) -> ApiResponse + Send + Sync>,
}
#[cfg(test)]
impl ScriptedHttp {
	pub(crate) fn new(reply: impl Fn(&ApiRequest) -> ApiResponse + Send + Sync + 'static) -> Self {
		Self { requests: Mutex::new(Vec::new()), reply: Box::new(reply) }
	}

	/// Answers every request with `body` and status 200.
	pub(crate) fn json(body: &'static str) -> Self {
		Self::new(move |_| ApiResponse { status: 200, body: body.as_bytes().to_vec() })
	}

	pub(crate) fn bodies(&self) -> Vec<Map<String, Value>> {
		self.requests
			.lock()
			.iter()
			.map(|request| {
				serde_json::from_slice(&request.body).expect("Recorded body should be a JSON object.")
			})
			.collect()
	}
}
#[cfg(test)]
impl ApiHttpClient for ScriptedHttp {
	fn post_json(&self, request: ApiRequest) -> HttpFuture<'_> {
		let response = (self.reply)(&request);

		self.requests.lock().push(request);

		Box::pin(async move { Ok(response) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn json_request_serializes_body() {
		let url = Url::parse("https://open.example.com/open/access/1.0/contract.info")
			.expect("Fixture URL should parse.");
		let mut body = Map::new();

		body.insert("appId".into(), Value::String("app-1".into()));

		let request = ApiRequest::json(url, &body)
			.expect("Serializing a JSON map should succeed.")
			.with_basic_auth("user", "pass");

		assert_eq!(request.body, br#"{"appId":"app-1"}"#);
		assert!(format!("{request:?}").contains("<redacted>"));
	}

	#[test]
	fn response_text_is_lossy() {
		let response = ApiResponse { status: 200, body: vec![b'o', b'k', 0xff] };

		assert_eq!(response.text(), "ok\u{fffd}");
	}
}

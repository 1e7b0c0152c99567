//! Named-operation dispatch over the uniform response envelope.
//!
//! [`Dispatcher::request`] resolves an operation name against the [`OperationTable`], attaches
//! the current backend credential to the parameters, POSTs them as JSON, and unwraps the
//! [`Envelope`]. Every call logs the outgoing parameters (before the credential is attached) and
//! the raw response body, tagged with the operation name and the `openId` parameter when present.

pub mod envelope;
pub mod operation;

pub use envelope::Envelope;
pub use operation::*;

// self
use crate::{
	_prelude::*,
	auth::CredentialKind,
	error::UnmarshalError,
	http::{ApiHttpClient, ApiRequest},
	obs::{self, FlowOutcome, FlowSpan},
	store::TokenStore,
};

/// Parameter carrying the backend credential on every dispatched call.
pub const TOKEN_FIELD: &str = "backendToken";
/// Parameter used as the log correlation id when present.
pub const CORRELATION_FIELD: &str = "openId";

/// Generic caller for table-registered operations.
#[derive(Clone)]
pub struct Dispatcher {
	http: Arc<dyn ApiHttpClient>,
	tokens: Arc<TokenStore>,
	operations: Arc<OperationTable>,
}
impl Dispatcher {
	/// Creates a dispatcher over a fixed operation table.
	pub fn new(
		http: Arc<dyn ApiHttpClient>,
		tokens: Arc<TokenStore>,
		operations: Arc<OperationTable>,
	) -> Self {
		Self { http, tokens, operations }
	}

	/// Operation table used for name resolution.
	pub fn operations(&self) -> &OperationTable {
		&self.operations
	}

	/// Calls `name` and decodes the result payload into `T`.
	pub async fn request<T>(&self, name: &str, params: Map<String, Value>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.dispatch(name, params, |payload| Ok(UnmarshalError::decode_value(name, payload)?))
			.await
	}

	/// Calls `name` and returns the raw result payload.
	pub async fn request_value(&self, name: &str, params: Map<String, Value>) -> Result<Value> {
		self.dispatch(name, params, Ok).await
	}

	async fn dispatch<T, F>(&self, name: &str, params: Map<String, Value>, decode: F) -> Result<T>
	where
		F: FnOnce(Value) -> Result<T>,
	{
		let correlation =
			params.get(CORRELATION_FIELD).and_then(Value::as_str).map(ToOwned::to_owned);
		let mut raw = String::new();

		obs::record_dispatch(FlowOutcome::Attempt);
		obs::log_dispatch_request(
			name,
			correlation.as_deref(),
			&serde_json::to_string(&params).unwrap_or_default(),
		);

		let result = FlowSpan::dispatch(name).instrument(self.call(name, params, &mut raw)).await;
		let result = result.and_then(decode);

		obs::log_dispatch_response(name, correlation.as_deref(), &raw, result.as_ref().err());

		match &result {
			Ok(_) => obs::record_dispatch(FlowOutcome::Success),
			Err(_) => obs::record_dispatch(FlowOutcome::Failure),
		}

		result
	}

	/// Resolves, authorizes, and posts one call; `raw` receives the response body.
	async fn call(
		&self,
		name: &str,
		mut params: Map<String, Value>,
		raw: &mut String,
	) -> Result<Value> {
		let url = self
			.operations
			.resolve(name)
			.cloned()
			.ok_or_else(|| Error::MethodNotFound { name: name.to_owned() })?;
		let token = self
			.tokens
			.get(CredentialKind::Backend)
			.await
			.map_err(|e| Error::AuthorizationFailed { source: Box::new(e) })?;

		params.insert(TOKEN_FIELD.into(), Value::String(token.expose().to_owned()));

		let response = self.http.post_json(ApiRequest::json(url, &params)?).await?;

		*raw = response.text();

		let envelope: Envelope = UnmarshalError::decode_slice(name, &response.body)?;

		envelope.into_result(name)
	}
}
impl Debug for Dispatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Dispatcher")
			.field("tokens", &self.tokens)
			.field("operations", &self.operations)
			.finish_non_exhaustive()
	}
}

// self
use crate::{
	_prelude::*,
	auth::{AppId, CredentialKind},
	cache::CacheError,
	store::TokenSource,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used around acquisition and dispatch.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Span covering one acquisition of a `kind` credential at `stage`.
	pub fn token(kind: CredentialKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("upapi_broker.token", kind = kind.as_str(), stage) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Span covering one dispatch of `operation`.
	pub fn dispatch(operation: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("upapi_broker.dispatch", operation) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = operation;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the source a credential was served from.
pub fn log_token_acquired(
	kind: CredentialKind,
	app_id: &AppId,
	source: TokenSource,
	remaining_seconds: u64,
) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			kind = kind.as_str(),
			%app_id,
			source = source.as_str(),
			remaining_seconds,
			"Credential acquired."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, app_id, source, remaining_seconds);
	}
}

/// Emits an acquisition failure.
pub fn log_token_failure(kind: CredentialKind, app_id: &AppId, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(
			kind = kind.as_str(),
			%app_id,
			code = error.error_code(),
			%error,
			"Credential acquisition failed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, app_id, error);
	}
}

/// Emits a distributed-cache write that failed after a successful issuance.
pub fn log_cache_write_failed(kind: CredentialKind, app_id: &AppId, error: &CacheError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			kind = kind.as_str(),
			%app_id,
			%error,
			"Issued credential could not be written to the distributed cache."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, app_id, error);
	}
}

/// Emits the end of a countdown.
pub fn log_countdown_expired(kind: CredentialKind) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(kind = kind.as_str(), "Credential countdown reached zero.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = kind;
	}
}

/// Emits the status of an issuance response; the body carries the credential and is omitted.
pub fn log_issuance_response(kind: CredentialKind, app_id: &AppId, status: u16) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			kind = kind.as_str(),
			%app_id,
			status,
			"Issuance response received."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, app_id, status);
	}
}

/// Emits the outgoing body of a dispatched operation.
pub fn log_dispatch_request(operation: &str, correlation: Option<&str>, body: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(
			operation,
			correlation = correlation.unwrap_or_default(),
			body,
			"Dispatching operation."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, correlation, body);
	}
}

/// Emits the raw response body of a dispatched operation and its failure, if any.
pub fn log_dispatch_response(
	operation: &str,
	correlation: Option<&str>,
	body: &str,
	error: Option<&Error>,
) {
	#[cfg(feature = "tracing")]
	{
		match error {
			Some(error) => tracing::error!(
				operation,
				correlation = correlation.unwrap_or_default(),
				body,
				code = error.error_code(),
				%error,
				"Operation failed."
			),
			None => tracing::info!(
				operation,
				correlation = correlation.unwrap_or_default(),
				body,
				"Operation completed."
			),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, correlation, body, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn event_helpers_accept_missing_correlation() {
		log_dispatch_request("ContractInfo", None, "{}");
		log_dispatch_response(
			"ContractInfo",
			Some("open-1"),
			"{}",
			Some(&Error::MethodNotFound { name: "ContractInfo".into() }),
		);
		log_countdown_expired(CredentialKind::Backend);
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::token(CredentialKind::Backend, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}

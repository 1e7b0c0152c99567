// self
use crate::{auth::CredentialKind, obs::FlowOutcome, store::TokenSource};

/// Records where a credential came from via the global metrics recorder (when enabled).
pub fn record_acquisition(kind: CredentialKind, source: TokenSource) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"upapi_broker_token_total",
			"kind" => kind.as_str(),
			"source" => source.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, source);
	}
}

/// Records a dispatch outcome via the global metrics recorder (when enabled).
pub fn record_dispatch(outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("upapi_broker_dispatch_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

//! Optional observability helpers for token acquisition and operation dispatch.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit the `upapi_broker.token` span (fields `kind` and
//!   `stage`), the `upapi_broker.dispatch` span (field `operation`), and events for request and
//!   response bodies, acquisition sources, countdown expiry, and failures.
//! - Enable `metrics` to increment `upapi_broker_token_total` (labels `kind` + `source`) and
//!   `upapi_broker_dispatch_total` (label `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

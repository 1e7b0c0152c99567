//! Uniform `{resp, msg, params}` response wrapper.

// self
use crate::{_prelude::*, issuer};

/// Response envelope shared by every platform operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
	/// Status code; `"00"` on success.
	#[serde(default)]
	pub resp: String,
	/// Human-readable status message.
	#[serde(default)]
	pub msg: String,
	/// Result payload; `null` when absent.
	#[serde(default)]
	pub params: Value,
}
impl Envelope {
	/// Returns `true` when the status code is the success code.
	pub fn is_success(&self) -> bool {
		self.resp == issuer::SUCCESS_CODE
	}

	/// Yields the payload, or [`Error::Code`] with `operation` as the fallback message.
	pub fn into_result(self, operation: &str) -> Result<Value> {
		if self.is_success() {
			Ok(self.params)
		} else {
			Err(issuer::code_error(self.resp, self.msg, operation))
		}
	}
}

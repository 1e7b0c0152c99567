//! Point-in-time view of a cached credential.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKind, TokenSecret},
};

/// Snapshot of a live token record handed to callers.
///
/// The snapshot does not follow the background countdown; `remaining_seconds` is the lifetime
/// observed when the snapshot was taken.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
	/// Credential kind the value belongs to.
	pub kind: CredentialKind,
	/// Bearer value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Remaining lifetime in whole seconds.
	pub remaining_seconds: u64,
}
impl Token {
	/// Returns the bearer value.
	pub fn expose(&self) -> &str {
		self.value.expose()
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("kind", &self.kind)
			.field("value", &"<redacted>")
			.field("remaining_seconds", &self.remaining_seconds)
			.finish()
	}
}

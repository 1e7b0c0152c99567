//! Remote credential issuance.
//!
//! Two deployment variants mint the same credentials: [`SignedIssuer`] calls the platform
//! directly with a shared-secret signature, while [`BasicAuthIssuer`] goes through a relay that
//! authenticates with HTTP basic auth. Both map their envelopes onto [`IssuedToken`], so the
//! token store never knows which one it talks to.

pub mod basic;
pub mod signed;

pub use basic::BasicAuthIssuer;
pub use signed::SignedIssuer;

// self
use crate::{
	_prelude::*,
	auth::{AppId, CredentialKind, TokenSecret},
	error::UnmarshalError,
};

/// Success code shared by the platform and relay envelopes.
pub const SUCCESS_CODE: &str = "00";
/// Longest credential lifetime accepted from an issuer or an override, in seconds (one year).
pub const MAX_EXPIRES_IN: u64 = 365 * 24 * 60 * 60;

/// Boxed future returned by [`RemoteIssuer::fetch`].
pub type IssuerFuture<'a> = Pin<Box<dyn Future<Output = Result<IssuedToken>> + 'a + Send>>;

/// Mints a fresh credential over the network.
pub trait RemoteIssuer
where
	Self: Send + Sync,
{
	/// Requests a new `kind` credential for `app_id`.
	fn fetch<'a>(&'a self, kind: CredentialKind, app_id: &'a AppId) -> IssuerFuture<'a>;
}

/// Freshly issued credential value and lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
	/// Bearer value.
	pub value: TokenSecret,
	/// Lifetime in whole seconds; within `1..=MAX_EXPIRES_IN`.
	pub expires_in: u64,
}
impl IssuedToken {
	/// Extracts the `kind` token and `expiresIn` from an envelope payload.
	///
	/// `expiresIn` may arrive as a number or a numeric string and must fall within
	/// `1..=MAX_EXPIRES_IN`. `expires_in_override` replaces the reported value after it has been
	/// validated; an override outside that range is ignored.
	pub(crate) fn from_payload(
		kind: CredentialKind,
		payload: &Map<String, Value>,
		expires_in_override: Option<u64>,
	) -> Result<Self, UnmarshalError> {
		let value = payload
			.get(kind.field_name())
			.and_then(Value::as_str)
			.filter(|value| !value.is_empty())
			.ok_or_else(|| UnmarshalError::MissingField {
				context: kind.issue_path().into(),
				field: kind.field_name(),
			})?;
		let reported = parse_expires_in(payload.get("expiresIn"))?;
		let expires_in = match expires_in_override {
			Some(fixed) if in_range(fixed) => fixed,
			_ => reported,
		};

		Ok(Self { value: TokenSecret::new(value), expires_in })
	}
}

fn parse_expires_in(raw: Option<&Value>) -> Result<u64, UnmarshalError> {
	let parsed = match raw {
		Some(Value::Number(number)) => number.as_u64(),
		Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
		_ => None,
	};

	match parsed {
		Some(secs) if in_range(secs) => Ok(secs),
		_ => Err(UnmarshalError::Expiry {
			raw: raw.map(ToString::to_string).unwrap_or_else(|| "null".into()),
		}),
	}
}

pub(crate) fn in_range(secs: u64) -> bool {
	(1..=MAX_EXPIRES_IN).contains(&secs)
}

/// Maps a non-success envelope onto [`Error::Code`], defaulting the message to `fallback`.
pub(crate) fn code_error(code: String, message: String, fallback: &str) -> Error {
	let message = if message.is_empty() { fallback.to_owned() } else { message };

	Error::Code { code, message }
}

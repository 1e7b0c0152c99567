//! Deterministic request signatures over a canonical, key-sorted field string.
//!
//! Issuance requests are signed by adding `timestamp` and `nonceStr` to the field set,
//! temporarily inserting the shared secret, hashing the sorted `key=value&...` string with
//! SHA-256, and storing the lowercase hex digest under `signature`. The secret never leaves
//! the hash input.

// crates.io
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Field carrying the unix timestamp (seconds, as a string).
pub const TIMESTAMP_FIELD: &str = "timestamp";
/// Field carrying the random nonce.
pub const NONCE_FIELD: &str = "nonceStr";
/// Field carrying the computed signature.
pub const SIGNATURE_FIELD: &str = "signature";
/// Field the shared secret occupies inside the hash input only.
pub const SECRET_FIELD: &str = "secret";

const SIGN_NONCE_LEN: usize = 16;

/// Stateless signer bound to one shared secret.
#[derive(Clone)]
pub struct Signer {
	secret: TokenSecret,
}
impl Signer {
	/// Creates a signer for the provided shared secret.
	pub fn new(secret: impl Into<String>) -> Self {
		Self { secret: TokenSecret::new(secret) }
	}

	/// Adds `timestamp`, `nonceStr`, and `signature` to `fields`.
	pub fn sign(&self, fields: &mut Map<String, Value>) {
		self.sign_with(fields, unix_timestamp(), nonce(SIGN_NONCE_LEN));
	}

	/// Signs with caller-provided timestamp and nonce.
	pub fn sign_with(&self, fields: &mut Map<String, Value>, timestamp: i64, nonce: String) {
		fields.insert(TIMESTAMP_FIELD.into(), Value::String(timestamp.to_string()));
		fields.insert(NONCE_FIELD.into(), Value::String(nonce));
		fields.remove(SIGNATURE_FIELD);
		fields.insert(SECRET_FIELD.into(), Value::String(self.secret.expose().to_owned()));

		let signature = sha256_hex(&canonical_string(fields));

		fields.remove(SECRET_FIELD);
		fields.insert(SIGNATURE_FIELD.into(), Value::String(signature));
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Signer").field("secret", &self.secret).finish()
	}
}

/// Renders `fields` as `k1=v1&k2=v2...` with keys in ascending byte order.
///
/// Strings render without quotes, `null` renders empty, everything else renders as JSON.
pub fn canonical_string(fields: &Map<String, Value>) -> String {
	let sorted = fields.iter().collect::<BTreeMap<_, _>>();
	let mut buf = String::new();

	for (idx, (key, value)) in sorted.into_iter().enumerate() {
		if idx > 0 {
			buf.push('&');
		}

		buf.push_str(key);
		buf.push('=');

		match value {
			Value::String(s) => buf.push_str(s),
			Value::Null => {},
			other => buf.push_str(&other.to_string()),
		}
	}

	buf
}

/// Lowercase hex SHA-256 digest of `input`.
pub fn sha256_hex(input: &str) -> String {
	hex::encode(Sha256::digest(input.as_bytes()))
}

/// Random alphanumeric string of `len` characters.
pub fn nonce(len: usize) -> String {
	rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// Current unix time in whole seconds.
pub fn unix_timestamp() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

//! Client-level error types shared across the token store, issuers, and dispatcher.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Distributed cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Transport failure (DNS, TCP, TLS) while reaching an endpoint.
	#[error(transparent)]
	Request(#[from] TransportError),
	/// Response envelope or payload could not be decoded.
	#[error(transparent)]
	Unmarshal(#[from] UnmarshalError),

	/// Caller-supplied parameters are invalid for the operation.
	#[error("Invalid parameter: {reason}.")]
	Param {
		/// Which parameter failed and why.
		reason: String,
	},
	/// Operation name is not registered in the operation table.
	#[error("Unknown operation `{name}`.")]
	MethodNotFound {
		/// Requested operation name.
		name: String,
	},
	/// Backend token acquisition failed; retry later.
	#[error("Failed to acquire an authorization token.")]
	AuthorizationFailed {
		/// Underlying acquisition failure.
		#[source]
		source: Box<Error>,
	},
	/// Platform answered with a non-success status code.
	#[error("({code}){message}")]
	Code {
		/// Platform status code.
		code: String,
		/// Platform message, or the operation name when the platform sent none.
		message: String,
	},
}
impl Error {
	/// Builds a [`Error::Param`] from any displayable reason.
	pub fn param(reason: impl Into<String>) -> Self {
		Self::Param { reason: reason.into() }
	}

	/// Returns the stable, platform-local code identifying the error class.
	pub fn error_code(&self) -> &'static str {
		match self {
			Self::Config(_) => "3100",
			Self::Param { .. } => "3101",
			Self::MethodNotFound { .. } => "3102",
			Self::AuthorizationFailed { .. } => "3103",
			Self::Request(_) => "3104",
			Self::Unmarshal(_) => "3105",
			Self::Code { .. } => "3110",
			Self::Cache(_) => "3120",
		}
	}
}

/// Configuration and validation failures raised while constructing a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required field is missing or blank.
	#[error("Config field `{field}` must be set.")]
	MissingField {
		/// Field name as it appears in the config document.
		field: &'static str,
	},
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Expiry override exceeds the longest accepted lifetime.
	#[error("Config field `expiresInOverride` is {value}; at most {max} seconds are allowed.")]
	ExpiresInOverride {
		/// Configured value.
		value: u64,
		/// Maximum permitted value.
		max: u64,
	},
	/// Encryption key is not valid hex.
	#[error("Config field `encryptKey` is not valid hex.")]
	InvalidEncryptKey {
		/// Underlying decoding failure.
		#[source]
		source: hex::FromHexError,
	},
	/// Base URL cannot be used for endpoint joins.
	#[error("Config field `{field}` is not a usable base URL: {url}.")]
	InvalidBaseUrl {
		/// Field name as it appears in the config document.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Endpoint path could not be joined onto its base URL.
	#[error("Endpoint `{path}` cannot be resolved.")]
	InvalidEndpoint {
		/// Relative endpoint path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Decode failures for envelopes and payloads.
#[derive(Debug, ThisError)]
pub enum UnmarshalError {
	/// Body or payload does not match the expected JSON shape.
	#[error("Failed to decode the {context} response.")]
	Body {
		/// Operation or issuance path being decoded.
		context: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Successful issuance envelope without a token value.
	#[error("The {context} response does not carry `{field}`.")]
	MissingField {
		/// Issuance path being decoded.
		context: String,
		/// Missing field name.
		field: &'static str,
	},
	/// A field that should carry base64 text does not.
	#[error("Field `{field}` is not valid base64.")]
	Encoding {
		/// Offending field name.
		field: &'static str,
		/// Underlying decoding failure.
		#[source]
		source: base64::DecodeError,
	},
	/// `expiresIn` is not an integer within `1..=MAX_EXPIRES_IN`.
	#[error(
		"The expiresIn value `{raw}` must be an integer between 1 and {max} seconds.",
		max = crate::issuer::MAX_EXPIRES_IN
	)]
	Expiry {
		/// Raw value sent by the issuer.
		raw: String,
	},
}
impl UnmarshalError {
	/// Decodes `bytes` into `T`, recording the failing JSON path on error.
	pub fn decode_slice<T>(context: &str, bytes: &[u8]) -> Result<T, Self>
	where
		T: DeserializeOwned,
	{
		let de = &mut serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(de)
			.map_err(|source| Self::Body { context: context.to_owned(), source })
	}

	/// Decodes an already-parsed JSON value into `T`, recording the failing JSON path on error.
	pub fn decode_value<T>(context: &str, value: Value) -> Result<T, Self>
	where
		T: DeserializeOwned,
	{
		serde_path_to_error::deserialize(value)
			.map_err(|source| Self::Body { context: context.to_owned(), source })
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

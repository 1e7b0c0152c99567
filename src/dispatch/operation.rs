//! Immutable mapping from operation names to endpoint URLs.

// self
use crate::{_prelude::*, error::ConfigError};

/// No-password contract signing.
pub const CONTRACT_APPLY: &str = "ContractApply";
/// No-password contract termination.
pub const CONTRACT_RELIEVE: &str = "ContractRelieve";
/// No-password contract lookup.
pub const CONTRACT_INFO: &str = "ContractInfo";
/// User push message.
pub const PUSH_MESSAGE: &str = "PushMessage";
/// OAuth authorization-code exchange.
pub const OAUTH_TOKEN: &str = "OAuthToken";
/// OAuth mobile-number lookup.
pub const OAUTH_MOBILE: &str = "OAuthMobile";

/// Built-in operations and their paths relative to the API base.
pub const STANDARD_OPERATIONS: [(&str, &str); 6] = [
	(CONTRACT_APPLY, "contract.apply"),
	(CONTRACT_RELIEVE, "contract.relieve"),
	(CONTRACT_INFO, "contract.info"),
	(PUSH_MESSAGE, "new.msg.push"),
	(OAUTH_TOKEN, "token"),
	(OAUTH_MOBILE, "user.mobile"),
];

/// Operation name to endpoint table, fixed once a client is constructed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationTable {
	endpoints: HashMap<String, Url>,
}
impl OperationTable {
	/// Builds the built-in table rooted at `api_base`.
	pub fn standard(api_base: &Url) -> Result<Self, ConfigError> {
		STANDARD_OPERATIONS.iter().try_fold(Self::default(), |table, (name, path)| {
			let url = api_base.join(path).map_err(|source| ConfigError::InvalidEndpoint {
				path: (*path).to_owned(),
				source,
			})?;

			Ok(table.with_endpoint(*name, url))
		})
	}

	/// Adds or replaces the endpoint registered for `name`.
	pub fn with_endpoint(mut self, name: impl Into<String>, url: Url) -> Self {
		self.endpoints.insert(name.into(), url);

		self
	}

	/// Looks up the endpoint registered for `name`.
	pub fn resolve(&self, name: &str) -> Option<&Url> {
		self.endpoints.get(name)
	}

	/// Registered operation names, in no particular order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.endpoints.keys().map(String::as_str)
	}

	/// Number of registered operations.
	pub fn len(&self) -> usize {
		self.endpoints.len()
	}

	/// Returns `true` when no operation is registered.
	pub fn is_empty(&self) -> bool {
		self.endpoints.is_empty()
	}
}
impl FromIterator<(String, Url)> for OperationTable {
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (String, Url)>,
	{
		Self { endpoints: iter.into_iter().collect() }
	}
}

//! The two credential kinds the platform issues.

// self
use crate::{_prelude::*, auth::AppId};

/// Category of bearer credential managed by the token store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
	/// Authorizes server-to-server business operations.
	Backend,
	/// Authorizes client-facing JS-widget signatures.
	Front,
}
impl CredentialKind {
	/// Every kind, in a stable order.
	pub const ALL: [Self; 2] = [Self::Backend, Self::Front];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Backend => "backend",
			Self::Front => "front",
		}
	}

	/// Distributed cache key prefix for this kind.
	pub const fn cache_prefix(self) -> &'static str {
		match self {
			Self::Backend => "upa-backend-token:",
			Self::Front => "upa-front-token:",
		}
	}

	/// Issuance endpoint path, relative to the issuer base URL.
	pub const fn issue_path(self) -> &'static str {
		match self {
			Self::Backend => "backendToken",
			Self::Front => "frontToken",
		}
	}

	/// Field carrying the token value in issuance envelopes and request bodies.
	pub const fn field_name(self) -> &'static str {
		self.issue_path()
	}

	/// Builds the distributed cache key shared by every process holding `app_id`.
	pub fn cache_key(self, app_id: &AppId) -> String {
		format!("{}{app_id}", self.cache_prefix())
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn cache_keys_are_prefixed_per_kind() {
		let app = AppId::new("app-1").expect("App id fixture should be valid.");

		assert_eq!(CredentialKind::Backend.cache_key(&app), "upa-backend-token:app-1");
		assert_eq!(CredentialKind::Front.cache_key(&app), "upa-front-token:app-1");
	}

	#[test]
	fn issue_paths_match_envelope_fields() {
		for kind in CredentialKind::ALL {
			assert_eq!(kind.issue_path(), kind.field_name());
		}

		assert_eq!(CredentialKind::Front.issue_path(), "frontToken");
	}
}

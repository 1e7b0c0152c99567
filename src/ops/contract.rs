//! No-password payment contract operations.

// self
use crate::{
	_prelude::*,
	auth::PlanId,
	client::AppClient,
	dispatch::{CONTRACT_APPLY, CONTRACT_INFO, CONTRACT_RELIEVE},
	ops::{insert_str, require},
};

/// Scope requested on the contract page.
pub const CONTRACT_SCOPE: &str = "upapi_contract";

/// Lifecycle state reported by [`AppClient::contract_info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractStatus {
	/// `"0"`: the user never signed.
	NotOpen,
	/// `"1"`: the contract is active.
	Opened,
	/// `"3"`: the contract was terminated.
	Relieved,
}
impl ContractStatus {
	/// Parses the platform's status code.
	pub fn from_code(code: &str) -> Option<Self> {
		match code {
			"0" => Some(Self::NotOpen),
			"1" => Some(Self::Opened),
			"3" => Some(Self::Relieved),
			_ => None,
		}
	}

	/// Platform status code.
	pub const fn code(self) -> &'static str {
		match self {
			Self::NotOpen => "0",
			Self::Opened => "1",
			Self::Relieved => "3",
		}
	}
}

/// Input for [`AppClient::contract_code_url`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCodeRequest {
	/// Redirect target; prefixed with the configured OAuth redirect.
	pub uri: String,
	/// Opaque state echoed back on redirect.
	pub state: String,
}

/// Input for [`AppClient::contract_apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractApplyRequest {
	/// User identifier.
	pub open_id: String,
	/// User OAuth access token.
	pub access_token: String,
	/// Code returned by the contract page.
	pub contract_code: String,
}

/// Result of [`AppClient::contract_apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractApply {
	/// Merchant contract code.
	pub contract_code: String,
	/// Platform contract identifier.
	pub contract_id: String,
	/// Platform operation time.
	pub operate_time: String,
}

/// Input for [`AppClient::contract_relieve`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRelieveRequest {
	/// User identifier.
	pub open_id: String,
	/// Platform contract identifier.
	pub contract_id: String,
	/// Merchant contract code.
	pub contract_code: String,
}

/// Result of [`AppClient::contract_relieve`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractRelieve {
	/// Merchant contract code.
	pub contract_code: String,
	/// Platform operation time.
	pub operate_time: String,
}

/// Input for [`AppClient::contract_info`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfoRequest {
	/// User identifier.
	pub open_id: String,
}

/// Result of [`AppClient::contract_info`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractInfo {
	/// Platform contract identifier.
	pub contract_id: String,
	/// Raw status code.
	pub contract_status: String,
}
impl ContractInfo {
	/// Parsed status, or `None` for codes this client does not know.
	pub fn status(&self) -> Option<ContractStatus> {
		ContractStatus::from_code(&self.contract_status)
	}
}

impl AppClient {
	/// URL of the page where a user signs the configured contract plan.
	pub fn contract_code_url(&self, request: &ContractCodeRequest) -> Result<Url> {
		let plan_id = self.plan_id()?;
		let redirect_uri = self.config().redirect_uri(&request.uri);

		self.portal_page(
			"noPwd/html/open.html",
			&[
				("appId", self.config().app_id.as_ref()),
				("redirectUri", redirect_uri.as_str()),
				("responseType", "code"),
				("scope", CONTRACT_SCOPE),
				("state", request.state.as_str()),
				("planId", plan_id.as_ref()),
			],
		)
	}

	/// Signs a contract with the code returned by the contract page.
	pub async fn contract_apply(&self, request: &ContractApplyRequest) -> Result<ContractApply> {
		require("openId", &request.open_id)?;

		let mut params = self.contract_params(&request.open_id)?;

		insert_str(&mut params, "accessToken", &request.access_token);
		insert_str(&mut params, "contractCode", &request.contract_code);

		self.request(CONTRACT_APPLY, params).await
	}

	/// Terminates a contract.
	pub async fn contract_relieve(
		&self,
		request: &ContractRelieveRequest,
	) -> Result<ContractRelieve> {
		require("openId", &request.open_id)?;

		let mut params = self.contract_params(&request.open_id)?;

		insert_str(&mut params, "contractId", &request.contract_id);
		insert_str(&mut params, "contractCode", &request.contract_code);

		self.request(CONTRACT_RELIEVE, params).await
	}

	/// Looks up the user's contract under the configured plan.
	pub async fn contract_info(&self, request: &ContractInfoRequest) -> Result<ContractInfo> {
		require("openId", &request.open_id)?;

		let params = self.contract_params(&request.open_id)?;

		self.request(CONTRACT_INFO, params).await
	}

	fn plan_id(&self) -> Result<&PlanId> {
		self.config().plan_id.as_ref().ok_or_else(|| Error::param("`planId` is not configured"))
	}

	fn contract_params(&self, open_id: &str) -> Result<Map<String, Value>> {
		let plan_id = self.plan_id()?;
		let mut params = self.base_params();

		insert_str(&mut params, "openId", open_id);
		insert_str(&mut params, "planId", plan_id);

		Ok(params)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_codes_round_trip() {
		for status in [ContractStatus::NotOpen, ContractStatus::Opened, ContractStatus::Relieved] {
			assert_eq!(ContractStatus::from_code(status.code()), Some(status));
		}

		assert_eq!(ContractStatus::from_code("2"), None);
	}

	#[test]
	fn info_decodes_sparse_payloads() {
		let info: ContractInfo = serde_json::from_str(r#"{"contractStatus":"1"}"#)
			.expect("Sparse contract info should decode.");

		assert_eq!(info.contract_id, "");
		assert_eq!(info.status(), Some(ContractStatus::Opened));
	}
}

//! User push messages.

// self
use crate::{
	_prelude::*,
	client::AppClient,
	dispatch::PUSH_MESSAGE,
	ops::{insert_str, require},
};

/// Input for [`AppClient::push_message`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessageRequest {
	/// Recipient.
	pub open_id: String,
	/// Message text.
	pub content: String,
	/// Link opened from the message.
	pub url: String,
}

impl AppClient {
	/// Sends a push message and returns the platform's raw result map.
	pub async fn push_message(&self, request: &PushMessageRequest) -> Result<Map<String, Value>> {
		require("openId", &request.open_id)?;

		let mut params = self.base_params();

		insert_str(&mut params, "openId", &request.open_id);
		insert_str(&mut params, "content", &request.content);
		insert_str(&mut params, "url", &request.url);

		let result: Option<Map<String, Value>> = self.request(PUSH_MESSAGE, params).await?;

		Ok(result.unwrap_or_default())
	}
}

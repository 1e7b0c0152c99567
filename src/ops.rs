//! Typed platform operations layered on [`AppClient`].
//!
//! Each helper validates its inputs, fills in the application-scoped parameters (`appId`,
//! `planId`), and hands the call to the dispatcher. The page-URL builders and the JS-widget
//! config never reach the business endpoints.

pub mod contract;
pub mod js_api;
pub mod message;
pub mod oauth;

pub use contract::*;
pub use js_api::*;
pub use message::*;
pub use oauth::*;

// self
use crate::{_prelude::*, client::AppClient};

/// Fails with [`Error::Param`] when `value` is empty.
fn require(field: &str, value: &str) -> Result<()> {
	if value.is_empty() {
		return Err(Error::param(format!("`{field}` must not be empty")));
	}

	Ok(())
}

fn insert_str(params: &mut Map<String, Value>, field: &str, value: &str) {
	params.insert(field.into(), Value::String(value.to_owned()));
}

impl AppClient {
	/// Builds a portal page URL whose query carries `pairs` sorted by key.
	fn portal_page(&self, path: &str, pairs: &[(&str, &str)]) -> Result<Url> {
		let mut url = self.config().portal_url(path)?;
		let sorted = pairs.iter().copied().collect::<BTreeMap<_, _>>();

		url.query_pairs_mut().extend_pairs(sorted);

		Ok(url)
	}
}

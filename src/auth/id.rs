//! Identifiers assigned by the open platform.
//!
//! App and plan ids end up verbatim in distributed cache keys, portal query strings and the
//! canonical signature string, so they are limited to ASCII alphanumerics plus `-` and `_`.
//! Anything else (separators such as `&`, `=`, `:` or whitespace) would change how those strings
//! are parsed on the other side.

// std
use std::{borrow::Borrow, marker::PhantomData, ops::Deref};
// self
use crate::_prelude::*;

/// Longest id the platform hands out, with headroom.
pub const PLATFORM_ID_MAX_LEN: usize = 64;

/// Application identity assigned by the platform; keys every cached credential.
pub type AppId = PlatformId<App>;
/// Contract plan identifier used by the no-password payment contract operations.
pub type PlanId = PlatformId<Plan>;

/// Names the flavor of a [`PlatformId`].
pub trait IdKind {
	/// Label used in errors and `Debug` output.
	const LABEL: &'static str;
}

/// Marker for [`AppId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum App {}
impl IdKind for App {
	const LABEL: &'static str = "App";
}

/// Marker for [`PlanId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Plan {}
impl IdKind for Plan {
	const LABEL: &'static str = "Plan";
}

/// Error returned when a platform id fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The id was empty.
	#[error("{kind} id cannot be empty.")]
	Empty {
		/// Id flavor.
		kind: &'static str,
	},
	/// The id contains a character outside `[A-Za-z0-9_-]`.
	#[error("{kind} id contains unsupported character {found:?} at byte {at}.")]
	InvalidCharacter {
		/// Id flavor.
		kind: &'static str,
		/// Offending character.
		found: char,
		/// Byte offset of the offending character.
		at: usize,
	},
	/// The id is longer than [`PLATFORM_ID_MAX_LEN`].
	#[error("{kind} id is {len} characters long; at most {max} are allowed.")]
	TooLong {
		/// Id flavor.
		kind: &'static str,
		/// Actual length.
		len: usize,
		/// Maximum permitted length.
		max: usize,
	},
}

/// Validated platform id of flavor `K`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformId<K> {
	value: String,
	kind: PhantomData<fn() -> K>,
}
impl<K> PlatformId<K>
where
	K: IdKind,
{
	/// Validates `value` as a platform id.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		check::<K>(&value)?;

		Ok(Self { value, kind: PhantomData })
	}

	/// Returns the id as a string slice.
	pub fn as_str(&self) -> &str {
		&self.value
	}
}
impl<K> Deref for PlatformId<K> {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.value
	}
}
impl<K> AsRef<str> for PlatformId<K> {
	fn as_ref(&self) -> &str {
		&self.value
	}
}
impl<K> Borrow<str> for PlatformId<K> {
	fn borrow(&self) -> &str {
		&self.value
	}
}
impl<K> From<PlatformId<K>> for String {
	fn from(id: PlatformId<K>) -> Self {
		id.value
	}
}
impl<K> FromStr for PlatformId<K>
where
	K: IdKind,
{
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl<K> Debug for PlatformId<K>
where
	K: IdKind,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}({})", K::LABEL, self.value)
	}
}
impl<K> Display for PlatformId<K> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.value)
	}
}
impl<K> Serialize for PlatformId<K> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.value)
	}
}
impl<'de, K> Deserialize<'de> for PlatformId<K>
where
	K: IdKind,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Self::new(raw).map_err(serde::de::Error::custom)
	}
}

fn check<K>(value: &str) -> Result<(), IdentifierError>
where
	K: IdKind,
{
	let kind = K::LABEL;

	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some((at, found)) =
		value.char_indices().find(|(_, c)| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
	{
		return Err(IdentifierError::InvalidCharacter { kind, found, at });
	}
	// Charset is ASCII past this point, so bytes and characters agree.
	if value.len() > PLATFORM_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, len: value.len(), max: PLATFORM_ID_MAX_LEN });
	}

	Ok(())
}

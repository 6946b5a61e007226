//! Secure handling for signing secrets and API keys
//!
//! Signing secrets arrive with a request, live exactly as long as the
//! request, and must never reach logs, error messages or serialized output.
//! The [`Secret`] type zeroizes its backing memory on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string whose contents are cleared from memory when dropped and redacted
/// everywhere it could otherwise leak.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
	inner: String,
}

impl Secret {
	pub fn new(secret: String) -> Self {
		Self { inner: secret }
	}

	/// Expose the secret value. Callers hand the result straight to a signer
	/// or an HTTP header; they do not store it.
	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl fmt::Debug for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Secret").field("inner", &"[REDACTED]").finish()
	}
}

impl fmt::Display for Secret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[REDACTED]")
	}
}

impl From<String> for Secret {
	fn from(secret: String) -> Self {
		Self::new(secret)
	}
}

impl From<&str> for Secret {
	fn from(secret: &str) -> Self {
		Self::new(secret.to_string())
	}
}

// Serialization always redacts; deserialization accepts the raw value so
// request bodies can carry a per-request signing secret.
impl Serialize for Secret {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for Secret {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let secret = String::deserialize(deserializer)?;
		Ok(Secret::new(secret))
	}
}

impl PartialEq for Secret {
	fn eq(&self, other: &Self) -> bool {
		constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
	}
}

impl Eq for Secret {}

/// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}

	let mut result = 0u8;
	for (x, y) in a.iter().zip(b.iter()) {
		result |= x ^ y;
	}
	result == 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_and_display_redact() {
		let secret = Secret::from("0xdeadbeef");
		assert!(format!("{:?}", secret).contains("[REDACTED]"));
		assert!(!format!("{:?}", secret).contains("deadbeef"));
		assert_eq!(format!("{}", secret), "[REDACTED]");
	}

	#[test]
	fn serialization_redacts_deserialization_accepts() {
		let secret = Secret::from("private-key");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");

		let parsed: Secret = serde_json::from_str("\"private-key\"").unwrap();
		assert_eq!(parsed.expose(), "private-key");
	}

	#[test]
	fn equality_is_value_based() {
		assert_eq!(Secret::from("a"), Secret::from("a"));
		assert_ne!(Secret::from("a"), Secret::from("b"));
		assert_ne!(Secret::from("a"), Secret::from("aa"));
	}
}

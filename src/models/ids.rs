//! Newtype wrapper for the transaction reference carried in the merchant
//! account template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of generated transaction references.
const SYNTHETIC_PREFIX: &str = "ORDER";

/// Transaction reference written into the merchant account template.
///
/// The value is advisory: wallets and the payment rail do not rely on it
/// for settlement, so generated references only need to be unique on a
/// best-effort basis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates an identifier from the given string.
    #[inline]
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Generates `ORDER<unix-millis>` for the given instant.
    #[inline]
    #[must_use]
    pub fn synthetic_at(instant: DateTime<Utc>) -> Self {
        Self(format!("{SYNTHETIC_PREFIX}{}", instant.timestamp_millis()))
    }

    /// Generates an identifier from the current time.
    #[inline]
    #[must_use]
    pub fn synthetic() -> Self {
        Self::synthetic_at(Utc::now())
    }

    /// Returns a reference to the inner string.
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for TransactionId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for TransactionId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TransactionId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_is_transparent() {
        let id = TransactionId::new("ABC12345".to_owned());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""ABC12345""#);
        let deserialized: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn synthetic_uses_unix_millis() {
        let instant = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let id = TransactionId::synthetic_at(instant);
        assert_eq!(id.as_inner(), "ORDER1700000000000");
    }

    #[test]
    fn synthetic_now_has_prefix() {
        let id = TransactionId::synthetic();
        assert!(id.as_inner().starts_with("ORDER"));
        assert!(id.as_inner().len() > "ORDER".len());
    }

    #[test]
    fn display_and_conversions() {
        let id: TransactionId = "tx-1".into();
        assert_eq!(id.to_string(), "tx-1");
        let owned: TransactionId = "tx-2".to_owned().into();
        assert_eq!(owned.into_inner(), "tx-2");
    }
}

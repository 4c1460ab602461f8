//! Explicit configuration passed to the encoder and to receipt code.
//!
//! Nothing in the library reads the environment; callers build these
//! structures themselves (the `pix` binary fills them from flags and
//! `.env`).

use serde::{Deserialize, Serialize};

use crate::models::LengthPolicy;

/// Encoder behaviour switches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncoderConfig {
    /// Handling of merchant names and cities over the length limit.
    pub length_policy: LengthPolicy,
}

/// The merchant identity printed on every receipt of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Merchant display name.
    pub name: String,
    /// Merchant city.
    pub city: String,
}

impl MerchantProfile {
    /// Creates a profile from a name and a city.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>, C: Into<String>>(name: N, city: C) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
        }
    }
}

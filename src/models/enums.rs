//! Enumeration types for encoder and printer options.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BrCodeError;

/// What the encoder does with a merchant name or city longer than the
/// format allows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthPolicy {
    /// Fail with [`BrCodeError::FieldTooLong`].
    #[default]
    Reject,
    /// Cut the field to the limit and log a warning.
    Truncate,
}

/// QR code error-correction level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCorrection {
    /// Recovers about 7% of the symbol.
    Low,
    /// Recovers about 15% of the symbol.
    #[default]
    Medium,
    /// Recovers about 25% of the symbol.
    Quartile,
    /// Recovers about 30% of the symbol.
    High,
}

impl ErrorCorrection {
    /// Parameter byte of the ESC/POS "select error correction level"
    /// function (`'0'` to `'3'`).
    #[inline]
    #[must_use]
    pub const fn escpos_code(self) -> u8 {
        match self {
            Self::Low => b'0',
            Self::Medium => b'1',
            Self::Quartile => b'2',
            Self::High => b'3',
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = BrCodeError;

    /// Accepts the single-letter names `L`, `M`, `Q` and `H`, in either
    /// case.
    #[inline]
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_uppercase().as_str() {
            "L" => Ok(Self::Low),
            "M" => Ok(Self::Medium),
            "Q" => Ok(Self::Quartile),
            "H" => Ok(Self::High),
            _ => Err(BrCodeError::UnknownLevel(raw.to_owned())),
        }
    }
}

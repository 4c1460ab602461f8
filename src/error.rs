//! Error types for the BR Code encoder.

use crate::tlv::Tag;

/// All errors that can occur while building or reading a BR Code payload.
#[derive(Debug, thiserror::Error)]
pub enum BrCodeError {
    /// A merchant field exceeds the limit the BR Code format allows.
    #[error("{field} is {actual} characters long, the limit is {max}")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum allowed character count.
        max: usize,
        /// Actual character count.
        actual: usize,
    },

    /// A required text field is empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field contains characters outside printable ASCII.
    #[error("{field} contains a character outside printable ASCII")]
    UnsupportedCharacter {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A TLV value does not fit in a two-digit length.
    #[error("value of tag {tag} is {length} characters long, the limit is 99")]
    ValueTooLong {
        /// Tag whose value overflowed.
        tag: Tag,
        /// Actual value length.
        length: usize,
    },

    /// A tag is not a two-digit decimal string.
    #[error("invalid tag {0:?}: expected two decimal digits")]
    InvalidTag(String),

    /// The amount is negative, NaN, infinite, or too large to encode.
    #[error("invalid amount {0}: expected a finite, non-negative value below 10000000000")]
    InvalidAmount(f64),

    /// Amount text read from a payload is not `digits[.dd]`.
    #[error("malformed amount {0:?}")]
    MalformedAmount(String),

    /// An error-correction level name is not one of L, M, Q or H.
    #[error("unknown error-correction level {0:?}: expected L, M, Q or H")]
    UnknownLevel(String),

    /// The payload ended in the middle of a TLV field.
    #[error("payload truncated at offset {offset}")]
    Truncated {
        /// Byte offset where the incomplete field starts.
        offset: usize,
    },

    /// A length prefix is not two decimal digits.
    #[error("invalid length {raw:?} for tag {tag}")]
    InvalidLength {
        /// Tag whose length could not be read.
        tag: Tag,
        /// The raw two-character length prefix.
        raw: String,
    },

    /// The payload has no trailing `6304` checksum field.
    #[error("payload does not end with a CRC field")]
    MissingChecksum,

    /// The trailing checksum does not match the payload contents.
    #[error("checksum mismatch: payload carries {found}, computed {computed}")]
    ChecksumMismatch {
        /// Checksum found at the end of the payload.
        found: String,
        /// Checksum computed over the payload.
        computed: String,
    },

    /// A field that every payload must carry is absent.
    #[error("payload is missing required tag {0}")]
    MissingField(Tag),

    /// The QR data is larger than an ESC/POS store command can carry.
    #[error("QR data is {0} bytes long, the ESC/POS limit is 65532")]
    QrDataTooLong(usize),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, BrCodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_from_serde_json() {
        let serde_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err = BrCodeError::from(serde_err);
        assert!(matches!(err, BrCodeError::Serialization(_)));
        assert!(err.to_string().contains("serialization error"));
    }

    #[test]
    fn field_too_long_display() {
        let err = BrCodeError::FieldTooLong {
            field: "merchant name",
            max: 25,
            actual: 26,
        };
        let msg = err.to_string();
        assert!(msg.contains("merchant name"));
        assert!(msg.contains("26"));
        assert!(msg.contains("25"));
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = BrCodeError::ChecksumMismatch {
            found: "0000".to_owned(),
            computed: "1D3D".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0000"));
        assert!(msg.contains("1D3D"));
    }

    #[test]
    fn value_too_long_mentions_tag() {
        let err = BrCodeError::ValueTooLong {
            tag: Tag::MERCHANT_ACCOUNT_INFORMATION,
            length: 120,
        };
        assert!(err.to_string().contains("tag 26"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BrCodeError>();
    }
}

//! Tag-length-value fields as used by EMV merchant-presented QR codes.
//!
//! A field serializes as `tag + length + value` with no separators. The
//! tag and the length are both two decimal digits, so a value holds at
//! most 99 characters. Values may themselves be a concatenation of
//! serialized fields (templates), see [`nested`] and
//! [`Field::children`].

use alloc::borrow::Cow;
use core::fmt;
use core::str::FromStr;

use crate::error::{BrCodeError, Result};

/// Largest value length a two-digit length prefix can express.
pub const MAX_VALUE_LEN: usize = 99;

/// Width of the tag and of the length prefix.
const PREFIX_WIDTH: usize = 2;

/// A two-digit numeric field identifier (`00` to `99`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u8);

impl Tag {
    /// Payload format indicator (top level).
    pub const PAYLOAD_FORMAT_INDICATOR: Self = Self(0);
    /// Merchant account information template (top level).
    pub const MERCHANT_ACCOUNT_INFORMATION: Self = Self(26);
    /// Merchant category code (top level).
    pub const MERCHANT_CATEGORY_CODE: Self = Self(52);
    /// Transaction currency, ISO 4217 numeric (top level).
    pub const TRANSACTION_CURRENCY: Self = Self(53);
    /// Transaction amount (top level).
    pub const TRANSACTION_AMOUNT: Self = Self(54);
    /// Country code, ISO 3166-1 alpha-2 (top level).
    pub const COUNTRY_CODE: Self = Self(58);
    /// Merchant name (top level).
    pub const MERCHANT_NAME: Self = Self(59);
    /// Merchant city (top level).
    pub const MERCHANT_CITY: Self = Self(60);
    /// Additional data field template (top level).
    pub const ADDITIONAL_DATA: Self = Self(62);
    /// CRC (top level, always last).
    pub const CRC: Self = Self(63);

    /// Globally unique identifier inside the merchant account template.
    pub const GLOBALLY_UNIQUE_IDENTIFIER: Self = Self(0);
    /// Transaction reference inside the merchant account template.
    pub const TRANSACTION_REFERENCE: Self = Self(1);
    /// Reference label inside the additional data template.
    pub const REFERENCE_LABEL: Self = Self(5);

    /// Creates a tag from its numeric value.
    ///
    /// # Errors
    ///
    /// Returns [`BrCodeError::InvalidTag`] if `value` is above 99.
    #[inline]
    pub fn new(value: u8) -> Result<Self> {
        if value > 99 {
            return Err(BrCodeError::InvalidTag(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value of the tag.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Tag {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for Tag {
    type Err = BrCodeError;

    #[inline]
    fn from_str(raw: &str) -> Result<Self> {
        parse_two_digits(raw)
            .map(Self)
            .ok_or_else(|| BrCodeError::InvalidTag(raw.to_owned()))
    }
}

/// Parses exactly two ASCII decimal digits.
fn parse_two_digits(raw: &str) -> Option<u8> {
    match *raw.as_bytes() {
        [tens @ b'0'..=b'9', units @ b'0'..=b'9'] => Some((tens - b'0') * 10 + (units - b'0')),
        _ => None,
    }
}

/// A single TLV field.
///
/// Encoder-built fields own their value; fields produced by [`fields`]
/// borrow from the parsed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'value> {
    /// Field identifier.
    tag: Tag,
    /// Raw field content.
    value: Cow<'value, str>,
}

impl<'value> Field<'value> {
    /// Creates a field, checking that the value fits a two-digit length.
    ///
    /// # Errors
    ///
    /// Returns [`BrCodeError::ValueTooLong`] if the value has more than
    /// [`MAX_VALUE_LEN`] characters.
    #[inline]
    pub fn new<V: Into<Cow<'value, str>>>(tag: Tag, raw: V) -> Result<Self> {
        let value = raw.into();
        let length = value.chars().count();
        if length > MAX_VALUE_LEN {
            return Err(BrCodeError::ValueTooLong { tag, length });
        }
        Ok(Self { tag, value })
    }

    /// Returns the field's tag.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the field's value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the field and returns its value as an owned string.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> String {
        self.value.into_owned()
    }

    /// Number of characters in the value, as written in the length prefix.
    #[inline]
    #[must_use]
    pub fn value_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Number of characters in the serialized field.
    #[inline]
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        PREFIX_WIDTH * 2 + self.value_len()
    }

    /// Parses the value as a sequence of nested fields.
    #[inline]
    #[must_use]
    pub fn children(&self) -> Fields<'_> {
        fields(&self.value)
    }
}

impl fmt::Display for Field<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}{}", self.tag, self.value_len(), self.value)
    }
}

/// Creates a template field whose value is the serialization of
/// `children`, in order.
///
/// # Errors
///
/// Returns [`BrCodeError::ValueTooLong`] if the serialized children
/// exceed [`MAX_VALUE_LEN`] characters.
#[inline]
pub fn nested(tag: Tag, children: &[Field<'_>]) -> Result<Field<'static>> {
    let value: String = children.iter().map(ToString::to_string).collect();
    Field::new(tag, value)
}

/// Returns an iterator over the fields serialized in `payload`.
#[inline]
#[must_use]
pub const fn fields(payload: &str) -> Fields<'_> {
    Fields {
        rest: payload,
        offset: 0,
        failed: false,
    }
}

/// Iterator over serialized TLV fields.
///
/// Yields an error once and then stops if the input is malformed.
#[derive(Debug, Clone)]
pub struct Fields<'payload> {
    /// Input that has not been consumed yet.
    rest: &'payload str,
    /// Byte offset of `rest` within the original input.
    offset: usize,
    /// Set after an error has been yielded.
    failed: bool,
}

impl<'payload> Fields<'payload> {
    /// Error for input that ends inside the field starting at `offset`.
    const fn truncated(&self) -> BrCodeError {
        BrCodeError::Truncated {
            offset: self.offset,
        }
    }

    /// Reads the next field from `rest`.
    fn read_field(&mut self) -> Result<Field<'payload>> {
        let (raw_tag, after_tag) = self
            .rest
            .split_at_checked(PREFIX_WIDTH)
            .ok_or_else(|| self.truncated())?;
        let tag: Tag = raw_tag.parse()?;
        let (raw_len, after_len) = after_tag
            .split_at_checked(PREFIX_WIDTH)
            .ok_or_else(|| self.truncated())?;
        let length = parse_two_digits(raw_len).ok_or_else(|| BrCodeError::InvalidLength {
            tag,
            raw: raw_len.to_owned(),
        })?;
        let (value, remainder) =
            split_chars(after_len, usize::from(length)).ok_or_else(|| self.truncated())?;
        self.offset += PREFIX_WIDTH * 2 + value.len();
        self.rest = remainder;
        Ok(Field {
            tag,
            value: Cow::Borrowed(value),
        })
    }
}

impl<'payload> Iterator for Fields<'payload> {
    type Item = Result<Field<'payload>>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.rest.is_empty() {
            return None;
        }
        let item = self.read_field();
        self.failed = item.is_err();
        Some(item)
    }
}

/// Splits `text` after `count` characters, or returns `None` if it is
/// shorter than that.
fn split_chars(text: &str, count: usize) -> Option<(&str, &str)> {
    let end = text
        .char_indices()
        .nth(count)
        .map(|(idx, _)| idx)
        .or_else(|| (text.chars().count() == count).then_some(text.len()))?;
    text.split_at_checked(end)
}

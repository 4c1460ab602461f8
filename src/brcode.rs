//! BR Code payload builder.
//!
//! Fields are emitted in the canonical order wallets and validators
//! expect, and the payload is closed by a CRC field computed over
//! everything before the checksum digits, including the `6304` prefix.

use chrono::{DateTime, Utc};

use crate::config::EncoderConfig;
use crate::crc;
use crate::error::{BrCodeError, Result};
use crate::models::{Amount, LengthPolicy, PixPaymentRequest, TransactionId};
use crate::tlv::{self, Field, Fields, Tag};

/// Payload format version.
const FORMAT_VERSION: &str = "01";

/// Globally unique identifier of the PIX arrangement.
pub const PIX_GUI: &str = "BR.GOV.BCB.PIX";

/// Merchant category code for an unclassified merchant.
const MERCHANT_CATEGORY: &str = "0000";

/// ISO 4217 numeric code of the Brazilian real.
const CURRENCY_BRL: &str = "986";

/// ISO 3166-1 alpha-2 code of Brazil.
const COUNTRY_BR: &str = "BR";

/// Tag and length of the CRC field, the last thing covered by the checksum.
const CRC_PREFIX: &str = "6304";

/// Number of hex digits in the checksum.
const CRC_DIGITS: usize = 4;

/// Longest merchant name the format accepts.
pub const MAX_MERCHANT_NAME: usize = 25;

/// Longest merchant city the format accepts.
pub const MAX_MERCHANT_CITY: usize = 15;

/// A complete, checksummed BR Code payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrCode(String);

impl BrCode {
    /// Serializes `fields` and appends the CRC field.
    fn seal(fields: &[Field<'_>]) -> Self {
        let mut payload: String = fields.iter().map(ToString::to_string).collect();
        payload.push_str(CRC_PREFIX);
        let checksum = crc::checksum(&payload);
        payload.push_str(&checksum);
        Self(payload)
    }

    /// Validates an existing payload: every field must parse, the last
    /// one must be a four-character CRC field, and the checksum must
    /// match.
    ///
    /// # Errors
    ///
    /// Returns a TLV parse error for malformed input,
    /// [`BrCodeError::MissingChecksum`] if the payload does not end with a
    /// CRC field, or [`BrCodeError::ChecksumMismatch`] if the checksum is
    /// wrong.
    #[inline]
    pub fn parse(text: &str) -> Result<Self> {
        let mut last = None;
        for item in tlv::fields(text) {
            last = Some(item?);
        }
        let crc_field = last
            .filter(|field| field.tag() == Tag::CRC && field.value_len() == CRC_DIGITS)
            .ok_or(BrCodeError::MissingChecksum)?;
        let body = text
            .len()
            .checked_sub(CRC_DIGITS)
            .and_then(|end| text.get(..end))
            .ok_or(BrCodeError::MissingChecksum)?;
        let computed = crc::checksum(body);
        if crc_field.value() != computed {
            return Err(BrCodeError::ChecksumMismatch {
                found: crc_field.into_value(),
                computed,
            });
        }
        Ok(Self(text.to_owned()))
    }

    /// Returns the payload text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the payload and returns its text.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the four checksum digits at the end of the payload.
    #[inline]
    #[must_use]
    pub fn checksum(&self) -> &str {
        self.0
            .len()
            .checked_sub(CRC_DIGITS)
            .and_then(|start| self.0.get(start..))
            .unwrap_or_default()
    }

    /// Iterates over the top-level fields, CRC included.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> Fields<'_> {
        tlv::fields(&self.0)
    }
}

impl core::fmt::Display for BrCode {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BrCode {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builder for [`BrCodeEncoder`].
#[derive(Debug, Default)]
pub struct BrCodeEncoderBuilder {
    /// Configuration being assembled.
    config: EncoderConfig,
}

impl BrCodeEncoderBuilder {
    /// Sets how over-long merchant names and cities are handled.
    #[inline]
    #[must_use]
    pub const fn length_policy(mut self, policy: LengthPolicy) -> Self {
        self.config.length_policy = policy;
        self
    }

    /// Replaces the whole configuration.
    #[inline]
    #[must_use]
    pub const fn config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the encoder.
    #[inline]
    #[must_use]
    pub const fn build(self) -> BrCodeEncoder {
        BrCodeEncoder {
            config: self.config,
        }
    }
}

/// Turns [`PixPaymentRequest`]s into [`BrCode`] payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrCodeEncoder {
    /// Encoder behaviour switches.
    config: EncoderConfig,
}

impl BrCodeEncoder {
    /// Creates a new builder for configuring the encoder.
    #[inline]
    #[must_use]
    pub fn builder() -> BrCodeEncoderBuilder {
        BrCodeEncoderBuilder::default()
    }

    /// Creates an encoder with the given configuration.
    #[inline]
    #[must_use]
    pub const fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Returns the encoder configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Builds the payload for `request`, generating a transaction id from
    /// the current time if the request has none.
    ///
    /// # Errors
    ///
    /// See [`BrCodeEncoder::encode_at`].
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn encode(&self, request: &PixPaymentRequest) -> Result<BrCode> {
        self.encode_at(request, Utc::now())
    }

    /// Builds the payload for `request`, using `now` for a generated
    /// transaction id.
    ///
    /// # Errors
    ///
    /// - [`BrCodeError::EmptyField`] for an empty merchant name or city.
    /// - [`BrCodeError::UnsupportedCharacter`] for text outside printable
    ///   ASCII.
    /// - [`BrCodeError::FieldTooLong`] for a name over 25 or a city over
    ///   15 characters, unless the truncation policy is active.
    /// - [`BrCodeError::InvalidAmount`] for a negative, NaN, infinite or
    ///   oversized amount.
    /// - [`BrCodeError::ValueTooLong`] if a transaction id or description
    ///   overflows its template.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn encode_at(&self, request: &PixPaymentRequest, now: DateTime<Utc>) -> Result<BrCode> {
        let name = self.fit("merchant name", &request.merchant_name, MAX_MERCHANT_NAME)?;
        let city = self.fit("merchant city", &request.merchant_city, MAX_MERCHANT_CITY)?;
        let amount = Amount::from_f64(request.amount)?;
        let transaction_id = request
            .transaction_id
            .clone()
            .filter(|id| !id.as_inner().is_empty())
            .unwrap_or_else(|| {
                let id = TransactionId::synthetic_at(now);
                tracing::debug!(transaction_id = %id, "generated transaction id");
                id
            });
        ensure_printable("transaction id", transaction_id.as_inner())?;
        let description = request
            .description
            .as_deref()
            .filter(|text| !text.is_empty());
        if let Some(text) = description {
            ensure_printable("description", text)?;
        }

        let mut fields = Vec::with_capacity(9);
        fields.push(Field::new(Tag::PAYLOAD_FORMAT_INDICATOR, FORMAT_VERSION)?);
        fields.push(tlv::nested(
            Tag::MERCHANT_ACCOUNT_INFORMATION,
            &[
                Field::new(Tag::GLOBALLY_UNIQUE_IDENTIFIER, PIX_GUI)?,
                Field::new(Tag::TRANSACTION_REFERENCE, transaction_id.as_inner())?,
            ],
        )?);
        fields.push(Field::new(Tag::MERCHANT_CATEGORY_CODE, MERCHANT_CATEGORY)?);
        fields.push(Field::new(Tag::TRANSACTION_CURRENCY, CURRENCY_BRL)?);
        if !amount.is_zero() {
            fields.push(Field::new(Tag::TRANSACTION_AMOUNT, amount.to_string())?);
        }
        fields.push(Field::new(Tag::COUNTRY_CODE, COUNTRY_BR)?);
        fields.push(Field::new(Tag::MERCHANT_NAME, name)?);
        fields.push(Field::new(Tag::MERCHANT_CITY, city)?);
        if let Some(text) = description {
            fields.push(tlv::nested(
                Tag::ADDITIONAL_DATA,
                &[Field::new(Tag::REFERENCE_LABEL, text)?],
            )?);
        }

        let code = BrCode::seal(&fields);
        tracing::trace!(length = code.0.len(), checksum = code.checksum(), "payload sealed");
        Ok(code)
    }

    /// Validates a merchant field and applies the length policy.
    fn fit<'text>(&self, field: &'static str, text: &'text str, max: usize) -> Result<&'text str> {
        if text.is_empty() {
            return Err(BrCodeError::EmptyField { field });
        }
        ensure_printable(field, text)?;
        let actual = text.len();
        if actual <= max {
            return Ok(text);
        }
        match self.config.length_policy {
            LengthPolicy::Reject => Err(BrCodeError::FieldTooLong { field, max, actual }),
            LengthPolicy::Truncate => {
                tracing::warn!(field, max, actual, "truncating over-long field");
                Ok(text.get(..max).unwrap_or(text))
            }
        }
    }
}

/// Checks that `text` only holds printable ASCII, so character count,
/// byte count and checksum input agree.
fn ensure_printable(field: &'static str, text: &str) -> Result<()> {
    if text.chars().all(|ch| ch == ' ' || ch.is_ascii_graphic()) {
        Ok(())
    } else {
        Err(BrCodeError::UnsupportedCharacter { field })
    }
}

/// Builds the payload for `request` with the default configuration.
///
/// # Errors
///
/// See [`BrCodeEncoder::encode_at`].
#[inline]
pub fn encode(request: &PixPaymentRequest) -> Result<BrCode> {
    BrCodeEncoder::default().encode(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Request from a typical printed receipt.
    fn receipt_request() -> PixPaymentRequest {
        PixPaymentRequest::new("LANCHONETE", "SAO PAULO", 25.90)
            .description("Pedido #ABC12345")
            .transaction_id(TransactionId::from("ABC12345"))
    }

    /// Fixed clock for generated transaction ids.
    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn receipt_payload_matches_reference() {
        let code = encode(&receipt_request()).unwrap();
        assert_eq!(
            code.as_str(),
            "00020126300014BR.GOV.BCB.PIX0108ABC12345520400005303986540525.90\
             5802BR5910LANCHONETE6009SAO PAULO62200516Pedido #ABC123456304E8C1"
        );
    }

    #[test]
    fn receipt_payload_structure() {
        let code = encode(&receipt_request()).unwrap();
        let text = code.as_str();
        assert!(text.starts_with("000201"));
        assert!(text.contains("5802BR"));
        assert!(text.contains("540525.90"));
        let (body, checksum) = text.split_at(text.len() - 4);
        assert!(body.ends_with("6304"));
        assert!(checksum.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_lowercase()));
        assert_eq!(crc::checksum(body), checksum);
        assert_eq!(code.checksum(), checksum);
    }

    #[test]
    fn encode_is_deterministic() {
        let request = receipt_request();
        assert_eq!(encode(&request).unwrap(), encode(&request).unwrap());
    }

    #[test]
    fn fields_are_in_canonical_order() {
        let code = encode(&receipt_request()).unwrap();
        let tags: Vec<Tag> = code
            .fields()
            .map(|item| item.map(|field| field.tag()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            tags,
            [
                Tag::PAYLOAD_FORMAT_INDICATOR,
                Tag::MERCHANT_ACCOUNT_INFORMATION,
                Tag::MERCHANT_CATEGORY_CODE,
                Tag::TRANSACTION_CURRENCY,
                Tag::TRANSACTION_AMOUNT,
                Tag::COUNTRY_CODE,
                Tag::MERCHANT_NAME,
                Tag::MERCHANT_CITY,
                Tag::ADDITIONAL_DATA,
                Tag::CRC,
            ]
        );
    }

    #[test]
    fn declared_lengths_match_values() {
        let code = encode(&receipt_request()).unwrap();
        let text = code.as_str();
        let mut offset = 0;
        let mut seen = Vec::new();
        while offset < text.len() {
            let tag = text.get(offset..offset + 2).unwrap();
            let declared: usize = text.get(offset + 2..offset + 4).unwrap().parse().unwrap();
            let value = text.get(offset + 4..offset + 4 + declared).unwrap();
            assert_eq!(value.len(), declared, "tag {tag}");
            seen.push((tag, value));
            offset += 4 + declared;
        }
        assert_eq!(offset, text.len());
        assert!(seen.contains(&("59", "LANCHONETE")));
        assert!(seen.contains(&("60", "SAO PAULO")));
        assert!(seen.contains(&("54", "25.90")));
        assert_eq!(seen.last(), Some(&("63", "E8C1")));
    }

    #[test]
    fn zero_amount_omits_amount_field() {
        let request = PixPaymentRequest::new("LANCHONETE", "SAO PAULO", 0.0)
            .transaction_id(TransactionId::from("ABC12345"));
        let code = encode(&request).unwrap();
        assert_eq!(
            code.as_str(),
            "00020126300014BR.GOV.BCB.PIX0108ABC123455204000053039865802BR\
             5910LANCHONETE6009SAO PAULO6304D6E5"
        );
        assert!(code.fields().all(|item| item.unwrap().tag() != Tag::TRANSACTION_AMOUNT));
    }

    #[test]
    fn empty_description_omits_additional_data() {
        let request = receipt_request().description("");
        let code = encode(&request).unwrap();
        assert!(!code.as_str().contains("6220"));
        assert!(code.fields().all(|item| item.unwrap().tag() != Tag::ADDITIONAL_DATA));
    }

    #[test]
    fn missing_transaction_id_is_generated() {
        let request = PixPaymentRequest::new("LANCHONETE", "SAO PAULO", 12.5);
        let code = BrCodeEncoder::default().encode_at(&request, fixed_now()).unwrap();
        assert_eq!(
            code.as_str(),
            "00020126400014BR.GOV.BCB.PIX0118ORDER1700000000000520400005303986540512.50\
             5802BR5910LANCHONETE6009SAO PAULO6304ADF3"
        );
    }

    #[test]
    fn empty_transaction_id_is_replaced() {
        let request = PixPaymentRequest::new("LANCHONETE", "SAO PAULO", 12.5)
            .transaction_id(TransactionId::from(""));
        let code = BrCodeEncoder::default().encode_at(&request, fixed_now()).unwrap();
        assert!(code.as_str().contains("0118ORDER1700000000000"));
    }

    #[test]
    fn floating_point_amount_is_rounded() {
        let request = receipt_request();
        let code = encode(&PixPaymentRequest {
            amount: 0.1 + 0.2,
            ..request
        })
        .unwrap();
        assert!(code.as_str().contains("54040.30"));
    }

    #[test]
    fn name_of_26_characters_is_rejected() {
        let request = PixPaymentRequest {
            merchant_name: "A".repeat(26),
            ..receipt_request()
        };
        let err = encode(&request).unwrap_err();
        assert!(matches!(
            err,
            BrCodeError::FieldTooLong {
                field: "merchant name",
                max: 25,
                actual: 26
            }
        ));
    }

    #[test]
    fn name_of_25_characters_is_accepted() {
        let request = PixPaymentRequest {
            merchant_name: "A".repeat(25),
            ..receipt_request()
        };
        let code = encode(&request).unwrap();
        assert!(code.as_str().contains(&format!("5925{}", "A".repeat(25))));
    }

    #[test]
    fn city_of_16_characters_is_rejected() {
        let request = PixPaymentRequest {
            merchant_city: "SAO JOSE DO RIO ".to_owned(),
            ..receipt_request()
        };
        assert!(matches!(
            encode(&request),
            Err(BrCodeError::FieldTooLong {
                field: "merchant city",
                max: 15,
                actual: 16
            })
        ));
    }

    #[test]
    fn truncate_policy_shortens_fields() {
        let encoder = BrCodeEncoder::builder()
            .length_policy(LengthPolicy::Truncate)
            .build();
        let request = PixPaymentRequest {
            merchant_name: "LANCHONETE DO BAIRRO CENTRAL".to_owned(),
            merchant_city: "SAO JOSE DOS CAMPOS".to_owned(),
            ..receipt_request()
        };
        let code = encoder.encode(&request).unwrap();
        assert!(code.as_str().contains("5925LANCHONETE DO BAIRRO CENT"));
        assert!(code.as_str().contains("6015SAO JOSE DOS CA"));
        assert!(BrCode::parse(code.as_str()).is_ok());
    }

    #[test]
    fn empty_merchant_fields_are_rejected() {
        let request = PixPaymentRequest::new("", "SAO PAULO", 1.0);
        assert!(matches!(
            encode(&request),
            Err(BrCodeError::EmptyField {
                field: "merchant name"
            })
        ));
        let request_city = PixPaymentRequest::new("LANCHONETE", "", 1.0);
        assert!(matches!(
            encode(&request_city),
            Err(BrCodeError::EmptyField {
                field: "merchant city"
            })
        ));
    }

    #[test]
    fn non_ascii_text_is_rejected() {
        let request = PixPaymentRequest::new("LANCHONETE", "SÃO PAULO", 1.0);
        assert!(matches!(
            encode(&request),
            Err(BrCodeError::UnsupportedCharacter {
                field: "merchant city"
            })
        ));
        let with_description = receipt_request().description("Pedido nº 7");
        assert!(matches!(
            encode(&with_description),
            Err(BrCodeError::UnsupportedCharacter {
                field: "description"
            })
        ));
    }

    #[test]
    fn negative_amount_always_fails_the_same_way() {
        let request = PixPaymentRequest {
            amount: -5.0,
            ..receipt_request()
        };
        for _ in 0_u8..3 {
            assert!(matches!(
                encode(&request),
                Err(BrCodeError::InvalidAmount(_))
            ));
        }
    }

    #[test]
    fn nan_amount_is_rejected() {
        let request = PixPaymentRequest {
            amount: f64::NAN,
            ..receipt_request()
        };
        assert!(matches!(encode(&request), Err(BrCodeError::InvalidAmount(_))));
    }

    #[test]
    fn long_transaction_id_overflows_template() {
        let request = receipt_request().transaction_id(TransactionId::new("T".repeat(78)));
        assert!(matches!(
            encode(&request),
            Err(BrCodeError::ValueTooLong {
                tag: Tag::MERCHANT_ACCOUNT_INFORMATION,
                length: 100
            })
        ));
        let fits = receipt_request().transaction_id(TransactionId::new("T".repeat(77)));
        assert!(encode(&fits).is_ok());
    }

    #[test]
    fn parse_accepts_published_example() {
        let text = "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000\
                    5204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***63041D3D";
        let code = BrCode::parse(text).unwrap();
        assert_eq!(code.checksum(), "1D3D");
        assert_eq!(code.to_string(), text);
    }

    #[test]
    fn parse_detects_tampering() {
        let code = encode(&receipt_request()).unwrap();
        let tampered = code.as_str().replace("25.90", "15.90");
        assert!(matches!(
            BrCode::parse(&tampered),
            Err(BrCodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn parse_requires_crc_field() {
        assert!(matches!(
            BrCode::parse("0002015802BR"),
            Err(BrCodeError::MissingChecksum)
        ));
        assert!(matches!(BrCode::parse(""), Err(BrCodeError::MissingChecksum)));
    }

    #[test]
    fn parse_rejects_truncated_payload() {
        let code = encode(&receipt_request()).unwrap();
        let cut = code.as_str().get(..code.as_str().len() - 2).unwrap();
        assert!(matches!(
            BrCode::parse(cut),
            Err(BrCodeError::Truncated { .. })
        ));
    }

    #[test]
    fn encoder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BrCodeEncoder>();
        assert_send_sync::<BrCode>();
    }
}

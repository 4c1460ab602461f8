//! Reading a BR Code payload back into its payment fields.

use serde::Serialize;

use crate::brcode::{BrCode, PIX_GUI};
use crate::error::{BrCodeError, Result};
use crate::models::{Amount, TransactionId};
use crate::tlv::{Field, Tag};

/// Payment information a wallet would read from a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPayment {
    /// Merchant display name.
    pub merchant_name: String,
    /// Merchant city.
    pub merchant_city: String,
    /// Amount, absent when the payer chooses it.
    pub amount: Option<Amount>,
    /// Transaction reference from the PIX merchant account template.
    pub transaction_id: Option<TransactionId>,
    /// Reference label from the additional data template.
    pub description: Option<String>,
    /// The four checksum digits.
    pub checksum: String,
}

/// Verifies `text` and extracts its payment fields.
///
/// Fields with tags the encoder never emits are ignored. A merchant
/// account template whose identifier is not `BR.GOV.BCB.PIX` (compared
/// case-insensitively) contributes no transaction id.
///
/// # Errors
///
/// Returns any error from [`BrCode::parse`], [`BrCodeError::MissingField`]
/// if the format indicator, merchant name or merchant city is absent, and
/// [`BrCodeError::MalformedAmount`] for an unreadable amount.
#[inline]
#[tracing::instrument(skip_all)]
pub fn decode(text: &str) -> Result<DecodedPayment> {
    let code = BrCode::parse(text)?;
    let mut has_format = false;
    let mut merchant_name = None;
    let mut merchant_city = None;
    let mut amount = None;
    let mut transaction_id = None;
    let mut description = None;

    for item in code.fields() {
        let field = item?;
        match field.tag() {
            Tag::PAYLOAD_FORMAT_INDICATOR => has_format = true,
            Tag::MERCHANT_ACCOUNT_INFORMATION => {
                transaction_id = pix_transaction_id(&field)?.or(transaction_id);
            }
            Tag::TRANSACTION_AMOUNT => amount = Some(field.value().parse::<Amount>()?),
            Tag::MERCHANT_NAME => merchant_name = Some(field.into_value()),
            Tag::MERCHANT_CITY => merchant_city = Some(field.into_value()),
            Tag::ADDITIONAL_DATA => description = child_value(&field, Tag::REFERENCE_LABEL)?,
            _ => {}
        }
    }

    if !has_format {
        return Err(BrCodeError::MissingField(Tag::PAYLOAD_FORMAT_INDICATOR));
    }
    Ok(DecodedPayment {
        merchant_name: merchant_name.ok_or(BrCodeError::MissingField(Tag::MERCHANT_NAME))?,
        merchant_city: merchant_city.ok_or(BrCodeError::MissingField(Tag::MERCHANT_CITY))?,
        amount,
        transaction_id,
        description,
        checksum: code.checksum().to_owned(),
    })
}

/// Returns the transaction reference of a PIX merchant account template.
fn pix_transaction_id(template: &Field<'_>) -> Result<Option<TransactionId>> {
    let is_pix = child_value(template, Tag::GLOBALLY_UNIQUE_IDENTIFIER)?
        .is_some_and(|gui| gui.eq_ignore_ascii_case(PIX_GUI));
    if !is_pix {
        return Ok(None);
    }
    Ok(child_value(template, Tag::TRANSACTION_REFERENCE)?.map(TransactionId::new))
}

/// Returns the value of the first child of `template` tagged `tag`.
fn child_value(template: &Field<'_>, tag: Tag) -> Result<Option<String>> {
    for item in template.children() {
        let child = item?;
        if child.tag() == tag {
            return Ok(Some(child.into_value()));
        }
    }
    Ok(None)
}

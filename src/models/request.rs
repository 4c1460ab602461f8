//! Payment request model.

use serde::{Deserialize, Serialize};

use super::TransactionId;
use crate::config::MerchantProfile;

/// Number of order-id characters shown in a receipt's reference label.
const ORDER_LABEL_LEN: usize = 8;

/// Input to the encoder: who is paid, how much, and how the payment is
/// labelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixPaymentRequest {
    /// Payee display name (at most 25 characters).
    pub merchant_name: String,
    /// Payee city (at most 15 characters).
    pub merchant_city: String,
    /// Amount in reais. Zero omits the amount field.
    pub amount: f64,
    /// Reference label for the additional data template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Transaction reference; generated from the clock when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
}

impl PixPaymentRequest {
    /// Creates a request with no description and no transaction id.
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>, C: Into<String>>(merchant_name: N, merchant_city: C, amount: f64) -> Self {
        Self {
            merchant_name: merchant_name.into(),
            merchant_city: merchant_city.into(),
            amount,
            description: None,
            transaction_id: None,
        }
    }

    /// Creates a request for the given merchant.
    #[inline]
    #[must_use]
    pub fn for_merchant(profile: &MerchantProfile, amount: f64) -> Self {
        Self::new(profile.name.as_str(), profile.city.as_str(), amount)
    }

    /// Creates the request printed on an order receipt: the order id is
    /// the transaction reference and `Pedido #<first 8 chars>` the label.
    #[inline]
    #[must_use]
    pub fn for_order(profile: &MerchantProfile, order_id: &str, total: f64) -> Self {
        let short_id: String = order_id.chars().take(ORDER_LABEL_LEN).collect();
        Self::for_merchant(profile, total)
            .description(format!("Pedido #{short_id}"))
            .transaction_id(TransactionId::from(order_id))
    }

    /// Sets the reference label.
    #[inline]
    #[must_use]
    pub fn description<T: Into<String>>(mut self, text: T) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Sets the transaction reference.
    #[inline]
    #[must_use]
    pub fn transaction_id(mut self, id: TransactionId) -> Self {
        self.transaction_id = Some(id);
        self
    }
}

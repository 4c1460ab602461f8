//! Data models for BR Code payment requests.
//!
//! This module contains the request type handed to the encoder, the
//! [`Amount`] and [`TransactionId`] value types it is built from, and
//! enumeration types for constrained option values.

mod amount;
mod enums;
mod ids;
mod request;

pub use amount::Amount;
pub use enums::{ErrorCorrection, LengthPolicy};
pub use ids::TransactionId;
pub use request::PixPaymentRequest;

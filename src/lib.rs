//! BR Code (PIX) payment payloads.
//!
//! This crate builds the EMV-style text a paying wallet scans from a QR
//! code: tag-length-value fields in canonical order, closed by a
//! CRC-16/CCITT-FALSE checksum. It can also verify and decode existing
//! payloads and wrap them in ESC/POS commands for thermal printers.
//!
//! ```
//! use pix_brcode::brcode::encode;
//! use pix_brcode::models::{PixPaymentRequest, TransactionId};
//!
//! let request = PixPaymentRequest::new("LANCHONETE", "SAO PAULO", 25.90)
//!     .description("Pedido #ABC12345")
//!     .transaction_id(TransactionId::from("ABC12345"));
//! let code = encode(&request)?;
//! assert!(code.as_str().starts_with("000201"));
//! assert_eq!(code.checksum(), "E8C1");
//! # Ok::<(), pix_brcode::error::BrCodeError>(())
//! ```

extern crate alloc;

pub mod brcode;
pub mod config;
pub mod crc;
pub mod decode;
pub mod error;
pub mod escpos;
pub mod models;
pub mod tlv;

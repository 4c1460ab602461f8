//! ESC/POS command sequences for printing a payload on a thermal printer.
//!
//! Only the byte encoding lives here; writing the bytes to a Bluetooth or
//! serial printer is up to the caller.

use crate::error::{BrCodeError, Result};
use crate::models::ErrorCorrection;

/// `ESC @`: reset the printer.
const INITIALIZE: [u8; 2] = [0x1B, 0x40];

/// `GS V 0`: full paper cut.
const CUT: [u8; 3] = [0x1D, 0x56, 0x00];

/// Line feed.
const LINE_FEED: u8 = 0x0A;

/// `GS ( k` prefix shared by every 2D-code function.
const QR_FUNCTION: [u8; 3] = [0x1D, 0x28, 0x6B];

/// `cn` byte selecting the QR code symbology.
const QR_SYMBOL: u8 = 0x31;

/// Bytes between the length and the data in the store function
/// (`cn fn m`).
const STORE_HEADER_LEN: usize = 3;

/// Smallest module size printers accept.
const MIN_MODULE_SIZE: u8 = 1;

/// Largest module size printers accept.
const MAX_MODULE_SIZE: u8 = 16;

/// Rendering options for [`qr_code_commands`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    /// Width of one QR module, in printer dots (1 to 16).
    pub module_size: u8,
    /// Error-correction level.
    pub error_correction: ErrorCorrection,
}

impl Default for QrOptions {
    #[inline]
    fn default() -> Self {
        Self {
            module_size: 6,
            error_correction: ErrorCorrection::Medium,
        }
    }
}

impl QrOptions {
    /// Creates options with module size 6 and medium error correction.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the module size, clamped to the 1 to 16 range.
    #[inline]
    #[must_use]
    pub fn module_size(mut self, dots: u8) -> Self {
        self.module_size = dots.clamp(MIN_MODULE_SIZE, MAX_MODULE_SIZE);
        self
    }

    /// Sets the error-correction level.
    #[inline]
    #[must_use]
    pub const fn error_correction(mut self, level: ErrorCorrection) -> Self {
        self.error_correction = level;
        self
    }
}

/// Appends one `GS ( k pL pH cn fn params...` function to `out`.
fn push_function(out: &mut Vec<u8>, function: u8, params: &[u8]) {
    let len = params.len() + 2;
    let [low, high, ..] = len.to_le_bytes();
    out.extend_from_slice(&QR_FUNCTION);
    out.extend_from_slice(&[low, high, QR_SYMBOL, function]);
    out.extend_from_slice(params);
}

/// Builds the command sequence that stores `data` as a QR code and prints
/// it: select model 2, set module size, set error correction, store the
/// data, print the symbol.
///
/// # Errors
///
/// Returns [`BrCodeError::QrDataTooLong`] if `data` does not fit the
/// two-byte length of the store function.
#[inline]
pub fn qr_code_commands(data: &str, options: &QrOptions) -> Result<Vec<u8>> {
    let bytes = data.as_bytes();
    if u16::try_from(bytes.len() + STORE_HEADER_LEN).is_err() {
        return Err(BrCodeError::QrDataTooLong(bytes.len()));
    }
    let module_size = options.module_size.clamp(MIN_MODULE_SIZE, MAX_MODULE_SIZE);

    let mut out = Vec::with_capacity(bytes.len() + 40);
    // model 2
    push_function(&mut out, 0x41, &[0x32, 0x00]);
    push_function(&mut out, 0x43, &[module_size]);
    push_function(&mut out, 0x45, &[options.error_correction.escpos_code()]);
    let mut store = Vec::with_capacity(bytes.len() + 1);
    store.push(0x30);
    store.extend_from_slice(bytes);
    push_function(&mut out, 0x50, &store);
    push_function(&mut out, 0x51, &[0x30]);
    Ok(out)
}

/// Wraps `text` for printing: reset, UTF-8 text, line feed, paper cut.
#[inline]
#[must_use]
pub fn text_commands(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + INITIALIZE.len() + CUT.len() + 1);
    out.extend_from_slice(&INITIALIZE);
    out.extend_from_slice(text.as_bytes());
    out.push(LINE_FEED);
    out.extend_from_slice(&CUT);
    out
}

//! CRC-16/CCITT-FALSE checksum used to close a BR Code payload.
//!
//! Parameters: width 16, polynomial `0x1021`, initial register `0xFFFF`,
//! no input or output reflection, no final XOR. The check value over
//! `"123456789"` is `0x29B1`.

use ::crc::{CRC_16_IBM_3740, Crc};

/// CRC-16/CCITT-FALSE, catalogued as `CRC-16/IBM-3740`.
const CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Computes the CRC-16/CCITT-FALSE of `data`.
#[inline]
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    CCITT_FALSE.checksum(data)
}

/// Renders a checksum as four uppercase, zero-padded hex digits.
#[inline]
#[must_use]
pub fn to_hex(crc: u16) -> String {
    format!("{crc:04X}")
}

/// Computes the checksum of `text` and renders it the way the payload
/// carries it.
#[inline]
#[must_use]
pub fn checksum(text: &str) -> String {
    to_hex(crc16(text.as_bytes()))
}

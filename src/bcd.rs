//! Binary-coded-decimal codec.
//!
//! Every register-encoding routine in this crate goes through these two
//! functions. The DS3231 stores each two-digit quantity as one byte with the
//! tens digit in the high nibble and the ones digit in the low nibble.

/// Packs a value in `0..=99` into a BCD byte.
///
/// The tens digit lands in the high nibble, the ones digit in the low
/// nibble: `encode_bcd(45) == 0x45`.
///
/// Values above 99 produce a byte whose high nibble is not a decimal digit;
/// callers are expected to range-check first.
#[must_use]
pub const fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Unpacks a BCD byte into a value in `0..=99`.
///
/// Exact inverse of [`encode_bcd`] for bytes whose nibbles are both `0..=9`.
/// Bytes with a nibble above 9 do not represent a decimal value; the result
/// is then `high * 10 + low` with no correction applied.
#[must_use]
pub const fn decode_bcd(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

//! Hexadecimal digit patterns for common-cathode 7-segment displays.
//!
//! Segment `a` is bit 0 through `g` on bit 6, decimal point on bit 7.
//! A set bit lights the segment.

/// Segment patterns for `0..=F`.
pub const HEX_DIGITS: [u8; 16] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_1111, // 9
    0b0111_0111, // A
    0b0111_1100, // b
    0b0011_1001, // C
    0b0101_1110, // d
    0b0111_1001, // E
    0b0111_0001, // F
];

/// Decimal point segment.
pub const DECIMAL_POINT: u8 = 0b1000_0000;

/// Encodes the low nibble of `value` as a segment pattern.
#[inline]
pub fn encode(value: u8) -> u8 {
    HEX_DIGITS[usize::from(value & 0x0F)]
}

//! Hardware abstraction for 8-bit I/O ports.
//!
//! Routines never touch registers directly. They write through [`OutputPort`]
//! and sample through [`InputPort`], which the board layer implements on top
//! of the real `PORTx`/`PINx` registers.

/// An 8-bit output port.
///
/// Writes are immediate and cannot fail. Bit helpers are read-modify-write on
/// the output latch, so bits owned by other routines are preserved.
pub trait OutputPort {
    /// Writes all eight output bits.
    fn write(&mut self, value: u8);

    /// Returns the value currently held in the output latch.
    fn latch(&self) -> u8;

    /// Drives a single bit high.
    fn set_bit(&mut self, bit: u8) {
        let value = self.latch() | mask(bit);
        self.write(value);
    }

    /// Drives a single bit low.
    fn clear_bit(&mut self, bit: u8) {
        let value = self.latch() & !mask(bit);
        self.write(value);
    }

    /// Inverts a single bit.
    fn toggle_bit(&mut self, bit: u8) {
        let value = self.latch() ^ mask(bit);
        self.write(value);
    }

    /// Sets or clears a single bit.
    fn put_bit(&mut self, bit: u8, high: bool) {
        if high {
            self.set_bit(bit);
        } else {
            self.clear_bit(bit);
        }
    }

    /// Replaces the bits selected by `mask` with the matching bits of `bits`.
    fn modify(&mut self, mask: u8, bits: u8) {
        let value = (self.latch() & !mask) | (bits & mask);
        self.write(value);
    }

    /// Returns whether a latch bit is currently high.
    fn is_set(&self, bit: u8) -> bool {
        self.latch() & mask(bit) != 0
    }
}

/// An 8-bit input port.
pub trait InputPort {
    /// Samples the pin levels.
    fn read(&mut self) -> u8;

    /// Samples a single pin level.
    fn read_bit(&mut self, bit: u8) -> bool {
        self.read() & mask(bit) != 0
    }
}

/// Electrical level that means "pressed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pulled high, pressing shorts the pin to ground.
    #[default]
    ActiveLow,
    /// Pulled low, pressing drives the pin high.
    ActiveHigh,
}

impl Polarity {
    /// Normalizes a raw pin level to pressed = `true`.
    #[inline]
    pub fn is_asserted(self, level: bool) -> bool {
        match self {
            Polarity::ActiveLow => !level,
            Polarity::ActiveHigh => level,
        }
    }
}

#[inline]
fn mask(bit: u8) -> u8 {
    1u8 << (bit & 0x07)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(u8);

    struct Pins(u8);

    impl InputPort for Pins {
        fn read(&mut self) -> u8 {
            self.0
        }
    }

    impl OutputPort for Latch {
        fn write(&mut self, value: u8) {
            self.0 = value;
        }

        fn latch(&self) -> u8 {
            self.0
        }
    }

    #[test]
    fn bit_helpers_preserve_other_bits() {
        let mut port = Latch(0b1000_0001);

        port.set_bit(3);
        assert_eq!(port.latch(), 0b1000_1001);

        port.clear_bit(7);
        assert_eq!(port.latch(), 0b0000_1001);

        port.toggle_bit(0);
        assert_eq!(port.latch(), 0b0000_1000);
        assert!(port.is_set(3));
        assert!(!port.is_set(0));
    }

    #[test]
    fn modify_only_touches_masked_bits() {
        let mut port = Latch(0xF5);
        port.modify(0x0F, 0x03);
        assert_eq!(port.latch(), 0xF3);
    }

    #[test]
    fn polarity_normalizes_to_pressed() {
        assert!(Polarity::ActiveLow.is_asserted(false));
        assert!(!Polarity::ActiveLow.is_asserted(true));
        assert!(Polarity::ActiveHigh.is_asserted(true));
    }

    #[test]
    fn read_bit_samples_one_pin() {
        let mut pins = Pins(0b0001_0100);
        assert!(pins.read_bit(2));
        assert!(!pins.read_bit(3));
        assert!(pins.read_bit(4));
    }
}

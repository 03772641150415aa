//! Exercise board layout.
//!
//! | Port | Bits   | Use                                         |
//! |------|--------|---------------------------------------------|
//! | D    | 0..=7  | LED bar; bits 3..=5 double as button LEDs   |
//! | B    | 0..=7  | 7-segment segments `a..g`, `dp`             |
//! | C    | 0, 1   | Digit select (left, right)                  |
//! | C    | 2..=4  | Buttons, active low with pull-ups           |
//! | C    | 5      | Test LED                                    |

use crate::config::ButtonConfig;
use crate::port::OutputPort;

/// Test LED on the control port.
pub const TEST_LED: u8 = 5;

/// Left digit select on the control port.
pub const SELECT_LEFT: u8 = 0;

/// Right digit select on the control port.
pub const SELECT_RIGHT: u8 = 1;

/// Button input bits on the control port.
pub const BUTTON_PINS: [u8; BUTTON_COUNT] = [2, 3, 4];

/// Number of buttons on the board.
pub const BUTTON_COUNT: usize = 3;

/// Bar bits doubling as button LEDs.
pub const BUTTON_LED_1: u8 = 3;
pub const BUTTON_LED_2: u8 = 4;

/// Low three bar bits driven by the sequence exercises.
pub const SEQUENCE_MASK: u8 = 0b0000_0111;

/// Low four bar bits driven by the combination exercise.
pub const COMBO_MASK: u8 = 0b0000_1111;

/// Button wiring of the board with the default debounce window.
pub const BUTTONS: ButtonConfig<BUTTON_COUNT> = ButtonConfig::new(BUTTON_PINS);

/// The three output banks.
pub struct Ports<P: OutputPort> {
    /// LED bar (port D).
    pub bar: P,
    /// Display segments (port B).
    pub segments: P,
    /// Digit selects, test LED and button pull-ups (port C).
    pub control: P,
    pull_ups: u8,
}

impl<P: OutputPort> Ports<P> {
    /// Takes ownership of the banks and drives them to the power-up state:
    /// all outputs low, pull-ups enabled on the board's button pins.
    pub fn new(bar: P, segments: P, control: P) -> Self {
        let mut ports = Self {
            bar,
            segments,
            control,
            pull_ups: BUTTONS.pull_up_mask(),
        };
        ports.reset();
        ports
    }

    /// Replaces the control bits kept high across resets, then resets.
    pub fn set_pull_ups(&mut self, mask: u8) {
        self.pull_ups = mask;
        self.reset();
    }

    /// Control bits kept high across resets.
    pub fn pull_ups(&self) -> u8 {
        self.pull_ups
    }

    /// Turns every output off, keeping the button pull-ups enabled.
    pub fn reset(&mut self) {
        self.bar.write(0x00);
        self.segments.write(0x00);
        self.control.write(self.pull_ups);
    }
}

/// Values shown on the two display digits, `0..=0xF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayDigits {
    pub left: u8,
    pub right: u8,
}

impl Default for DisplayDigits {
    /// Left counts up from 0, right counts down from F.
    fn default() -> Self {
        Self {
            left: 0x0,
            right: 0xF,
        }
    }
}

//! LED bar and test LED animations.
//!
//! Bit 0 of the bar is the rightmost LED. Holds and pauses between animation
//! passes are timed phases of their own, so the loop keeps running through them.

use super::{Context, Routine, millis};
use crate::board::TEST_LED;
use crate::port::OutputPort;
use crate::time::TimeInstant;
use crate::timed::Interval;

const BAR_LEDS: u8 = 8;
const LAST_LED: u8 = BAR_LEDS - 1;

// Steps of `FillHold` after the eight fill steps.
const HOLD_STEP: u8 = BAR_LEDS;
const DARK_STEP: u8 = BAR_LEDS + 1;

/// Which end of the bar an animation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillDirection {
    /// Bit 0 first.
    RightToLeft,
    /// Bit 7 first.
    LeftToRight,
}

impl FillDirection {
    /// Bar bit lit at position `index` of the pass.
    #[inline]
    pub fn bit(self, index: u8) -> u8 {
        match self {
            FillDirection::RightToLeft => index,
            FillDirection::LeftToRight => LAST_LED - index,
        }
    }
}

/// Test LED blinking six toggles fast, then six toggles slow.
pub struct TwoSpeedBlink<I: TimeInstant> {
    interval: Interval<I>,
    toggles: u8,
}

impl<I: TimeInstant> TwoSpeedBlink<I> {
    pub const FAST_MS: u64 = 200;
    pub const SLOW_MS: u64 = 500;
    const TOGGLES_PER_SPEED: u8 = 6;

    pub fn new(start: I) -> Self {
        Self {
            interval: Interval::new(start),
            toggles: 0,
        }
    }
}

impl<I: TimeInstant> Routine<I> for TwoSpeedBlink<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let period = if self.toggles < Self::TOGGLES_PER_SPEED {
            Self::FAST_MS
        } else {
            Self::SLOW_MS
        };

        if self.interval.poll(ctx.now, millis(period)) {
            ctx.ports.control.toggle_bit(TEST_LED);
            self.toggles = (self.toggles + 1) % (2 * Self::TOGGLES_PER_SPEED);
        }
    }
}

/// Lights the bar one LED at a time and keeps them lit, holds, goes dark, repeats.
pub struct FillHold<I: TimeInstant> {
    interval: Interval<I>,
    direction: FillDirection,
    step: u8,
}

impl<I: TimeInstant> FillHold<I> {
    pub const STEP_MS: u64 = 200;
    pub const HOLD_MS: u64 = 500;
    pub const DARK_MS: u64 = 300;

    pub fn new(start: I, direction: FillDirection) -> Self {
        Self {
            interval: Interval::new(start),
            direction,
            step: 0,
        }
    }
}

impl<I: TimeInstant> Routine<I> for FillHold<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let period = match self.step {
            HOLD_STEP => Self::HOLD_MS,
            DARK_STEP => Self::DARK_MS,
            _ => Self::STEP_MS,
        };

        if !self.interval.poll(ctx.now, millis(period)) {
            return;
        }

        match self.step {
            // Hold elapsed: blank the bar and start the dark pause.
            HOLD_STEP => ctx.ports.bar.write(0x00),
            DARK_STEP => {}
            index => ctx.ports.bar.set_bit(self.direction.bit(index)),
        }

        self.step = (self.step + 1) % (DARK_STEP + 1);
    }
}

/// A single lit LED walking right to left.
pub struct Chaser<I: TimeInstant> {
    interval: Interval<I>,
    position: u8,
}

impl<I: TimeInstant> Chaser<I> {
    pub const STEP_MS: u64 = 150;

    pub fn new(start: I) -> Self {
        Self {
            interval: Interval::new(start),
            position: 0,
        }
    }
}

impl<I: TimeInstant> Routine<I> for Chaser<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if self.interval.poll(ctx.now, millis(Self::STEP_MS)) {
            ctx.ports.bar.write(1 << self.position);
            self.position = (self.position + 1) % BAR_LEDS;
        }
    }
}

/// Position bouncing between both ends of the bar.
#[derive(Debug, Clone, Copy)]
struct Bounce {
    position: u8,
    rising: bool,
}

impl Bounce {
    const fn new() -> Self {
        Self {
            position: 0,
            rising: true,
        }
    }

    /// Moves one step. Returns `true` when the walk arrives back at bit 0.
    fn advance(&mut self) -> bool {
        if self.rising {
            self.position += 1;
            if self.position >= LAST_LED {
                self.rising = false;
            }
            false
        } else {
            self.position -= 1;
            if self.position == 0 {
                self.rising = true;
                return true;
            }
            false
        }
    }
}

/// A single lit LED bouncing end to end.
pub struct PingPong<I: TimeInstant> {
    interval: Interval<I>,
    bounce: Bounce,
}

impl<I: TimeInstant> PingPong<I> {
    pub const STEP_MS: u64 = 100;

    pub fn new(start: I) -> Self {
        Self {
            interval: Interval::new(start),
            bounce: Bounce::new(),
        }
    }
}

impl<I: TimeInstant> Routine<I> for PingPong<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if self.interval.poll(ctx.now, millis(Self::STEP_MS)) {
            ctx.ports.bar.write(1 << self.bounce.position);
            self.bounce.advance();
        }
    }
}

/// Starts fully lit and switches LEDs off while bouncing; refills on return to bit 0.
pub struct Eraser<I: TimeInstant> {
    interval: Interval<I>,
    bounce: Bounce,
    lit: u8,
}

impl<I: TimeInstant> Eraser<I> {
    pub const STEP_MS: u64 = 150;

    pub fn new(start: I) -> Self {
        Self {
            interval: Interval::new(start),
            bounce: Bounce::new(),
            lit: 0xFF,
        }
    }
}

impl<I: TimeInstant> Routine<I> for Eraser<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if self.interval.poll(ctx.now, millis(Self::STEP_MS)) {
            self.lit &= !(1 << self.bounce.position);
            ctx.ports.bar.write(self.lit);

            if self.bounce.advance() {
                self.lit = 0xFF;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlashPhase {
    Filling(u8),
    Flashing(u8),
    Dark,
}

/// Fills left to right, flashes the whole bar five times, rests dark.
pub struct FillFlash<I: TimeInstant> {
    interval: Interval<I>,
    phase: FlashPhase,
}

impl<I: TimeInstant> FillFlash<I> {
    pub const STEP_MS: u64 = 200;
    pub const FLASH_MS: u64 = 200;
    pub const DARK_MS: u64 = 500;
    const FLASH_TOGGLES: u8 = 10;

    pub fn new(start: I) -> Self {
        Self {
            interval: Interval::new(start),
            phase: FlashPhase::Filling(0),
        }
    }
}

impl<I: TimeInstant> Routine<I> for FillFlash<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let period = match self.phase {
            FlashPhase::Filling(_) => Self::STEP_MS,
            FlashPhase::Flashing(_) => Self::FLASH_MS,
            FlashPhase::Dark => Self::DARK_MS,
        };

        if !self.interval.poll(ctx.now, millis(period)) {
            return;
        }

        self.phase = match self.phase {
            FlashPhase::Filling(index) => {
                ctx.ports.bar.set_bit(FillDirection::LeftToRight.bit(index));
                if index == LAST_LED {
                    FlashPhase::Flashing(0)
                } else {
                    FlashPhase::Filling(index + 1)
                }
            }
            // The last toggle leaves the bar lit for one flash period
            FlashPhase::Flashing(toggles) if toggles >= Self::FLASH_TOGGLES => {
                ctx.ports.bar.write(0x00);
                FlashPhase::Dark
            }
            FlashPhase::Flashing(toggles) => {
                let next = if ctx.ports.bar.latch() == 0xFF { 0x00 } else { 0xFF };
                ctx.ports.bar.write(next);
                FlashPhase::Flashing(toggles + 1)
            }
            FlashPhase::Dark => {
                ctx.ports.bar.set_bit(FillDirection::LeftToRight.bit(0));
                FlashPhase::Filling(1)
            }
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepPhase {
    Forward(u8),
    Hold,
    Reverse(u8),
    Pause,
    Dark,
}

/// Fills right to left, clears, fills left to right, clears, rests.
pub struct FillThenReverse<I: TimeInstant> {
    interval: Interval<I>,
    phase: SweepPhase,
}

impl<I: TimeInstant> FillThenReverse<I> {
    pub const STEP_MS: u64 = 200;
    pub const HOLD_MS: u64 = 500;
    pub const DARK_MS: u64 = 300;

    pub fn new(start: I) -> Self {
        Self {
            interval: Interval::new(start),
            phase: SweepPhase::Forward(0),
        }
    }
}

impl<I: TimeInstant> Routine<I> for FillThenReverse<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let period = match self.phase {
            SweepPhase::Forward(_) | SweepPhase::Reverse(_) => Self::STEP_MS,
            SweepPhase::Hold | SweepPhase::Pause => Self::HOLD_MS,
            SweepPhase::Dark => Self::DARK_MS,
        };

        if !self.interval.poll(ctx.now, millis(period)) {
            return;
        }

        let bar = &mut ctx.ports.bar;
        self.phase = match self.phase {
            SweepPhase::Forward(index) => {
                bar.set_bit(FillDirection::RightToLeft.bit(index));
                if index == LAST_LED {
                    SweepPhase::Hold
                } else {
                    SweepPhase::Forward(index + 1)
                }
            }
            SweepPhase::Hold => {
                bar.write(0x00);
                SweepPhase::Reverse(0)
            }
            SweepPhase::Reverse(index) => {
                bar.set_bit(FillDirection::LeftToRight.bit(index));
                if index == LAST_LED {
                    SweepPhase::Pause
                } else {
                    SweepPhase::Reverse(index + 1)
                }
            }
            SweepPhase::Pause => {
                bar.write(0x00);
                SweepPhase::Dark
            }
            SweepPhase::Dark => SweepPhase::Forward(0),
        };
    }
}

/// Direction of [`BinaryCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountDirection {
    /// 0, 1, .. 255, 0, ..
    Up,
    /// 255, 254, .. 0, 255, ..
    Down,
}

/// Shows an 8-bit binary count on the bar.
pub struct BinaryCounter<I: TimeInstant> {
    interval: Interval<I>,
    direction: CountDirection,
    value: u8,
}

impl<I: TimeInstant> BinaryCounter<I> {
    pub const STEP_MS: u64 = 250;

    pub fn new(start: I, direction: CountDirection) -> Self {
        let value = match direction {
            CountDirection::Up => 0x00,
            CountDirection::Down => 0xFF,
        };

        Self {
            interval: Interval::new(start),
            direction,
            value,
        }
    }
}

impl<I: TimeInstant> Routine<I> for BinaryCounter<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if self.interval.poll(ctx.now, millis(Self::STEP_MS)) {
            ctx.ports.bar.write(self.value);
            self.value = match self.direction {
                CountDirection::Up => self.value.wrapping_add(1),
                CountDirection::Down => self.value.wrapping_sub(1),
            };
        }
    }
}

//! Exercise routines driven by the dispatch loop.
//!
//! Each routine owns its persistent state (timers, phase counters) and is
//! called once per loop iteration through [`Routine::run`]. A routine reads the
//! debounced buttons and the instant captured for this iteration, decides
//! whether anything is due, and writes the ports. None of them wait.

use crate::board::{BUTTON_COUNT, DisplayDigits, Ports};
use crate::debounce::ButtonBank;
use crate::port::OutputPort;
use crate::time::{TimeDuration, TimeInstant};

pub mod buttons;
pub mod display;
pub mod leds;

pub use buttons::{
    Accelerating, Alternating, ClickSpeed, ComboLeds, DirectionSequence, ExclusiveOr,
    HeldSequence, Lead, LedMode, ModeCycle, ModeDisplay, Toggle,
};
pub use display::HexDisplay;
pub use leds::{
    BinaryCounter, Chaser, CountDirection, Eraser, FillDirection, FillFlash, FillHold,
    FillThenReverse, PingPong, TwoSpeedBlink,
};

/// Everything a routine may look at or drive during one loop iteration.
pub struct Context<'a, I: TimeInstant, P: OutputPort> {
    /// Instant sampled at the start of the iteration.
    pub now: I,
    /// Debounced buttons, already polled for this iteration.
    pub buttons: &'a mut ButtonBank<I, BUTTON_COUNT>,
    /// Output banks.
    pub ports: &'a mut Ports<P>,
    /// Digits shown by the display multiplexer.
    pub digits: &'a mut DisplayDigits,
}

/// One cooperative exercise.
pub trait Routine<I: TimeInstant> {
    /// Performs whatever work is due at `ctx.now`. Must not block.
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>);
}

#[inline]
pub(crate) fn millis<D: TimeDuration>(millis: u64) -> D {
    D::from_millis(millis)
}

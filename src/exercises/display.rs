//! Two multiplexed hexadecimal digits.

use super::{Context, Routine, millis};
use crate::board::{SELECT_LEFT, SELECT_RIGHT};
use crate::port::OutputPort;
use crate::seven_segment;
use crate::time::TimeInstant;
use crate::timed::Interval;

/// Alternates the two digits every few milliseconds and advances both
/// counters twice a second: left counts 0→F, right counts F→0.
///
/// The digit values live in the shared [`DisplayDigits`](crate::board::DisplayDigits),
/// so another routine running in the same loop may overwrite them.
pub struct HexDisplay<I: TimeInstant> {
    multiplex: Interval<I>,
    count: Interval<I>,
    left_next: bool,
}

impl<I: TimeInstant> HexDisplay<I> {
    pub const MULTIPLEX_MS: u64 = 5;
    pub const COUNT_MS: u64 = 500;

    pub fn new(start: I) -> Self {
        Self {
            multiplex: Interval::new(start),
            count: Interval::new(start),
            left_next: true,
        }
    }
}

impl<I: TimeInstant> Routine<I> for HexDisplay<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if self.multiplex.poll(ctx.now, millis(Self::MULTIPLEX_MS)) {
            let (off, on, value) = if self.left_next {
                (SELECT_RIGHT, SELECT_LEFT, ctx.digits.left)
            } else {
                (SELECT_LEFT, SELECT_RIGHT, ctx.digits.right)
            };

            // Blank the other digit before changing segments to avoid ghosting.
            ctx.ports.control.clear_bit(off);
            ctx.ports.segments.write(seven_segment::encode(value));
            ctx.ports.control.set_bit(on);
            self.left_next = !self.left_next;
        }

        if self.count.poll(ctx.now, millis(Self::COUNT_MS)) {
            let digits = &mut *ctx.digits;
            digits.left = digits.left.wrapping_add(1) & 0x0F;
            digits.right = (digits.right & 0x0F).checked_sub(1).unwrap_or(0x0F);
        }
    }
}

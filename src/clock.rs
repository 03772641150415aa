//! Millisecond tick counter shared between the timer interrupt and the poll loop.
//!
//! [`TickCounter`] is the backing store of the monotonic clock. The timer
//! interrupt calls [`TickCounter::tick`] once per period and loop code reads it
//! through [`TickCounter::now`]. Both sides go through a critical section, so a
//! multi-byte counter is never observed half-written on 8-bit targets.
//!
//! The counter width is a type parameter. Firmware normally uses `u32`
//! (wraps after ~49.7 days at 1 kHz), tests use `u8` or `u16` to force
//! wraparound in a few hundred ticks.

use core::cell::Cell;
use core::fmt::Debug;

use critical_section::Mutex;

use crate::time::{TimeDuration, TimeInstant, TimeSource};

/// Unsigned integer usable as a wrapping tick counter.
pub trait Counter: Copy + Eq + Ord + Debug {
    /// Counter value at power-up.
    const ZERO: Self;

    /// Largest representable value.
    const MAX: Self;

    /// Adds one, wrapping to zero past [`Counter::MAX`].
    fn wrapping_inc(self) -> Self;

    /// Wrapping addition.
    fn wrapping_add(self, other: Self) -> Self;

    /// Wrapping subtraction.
    fn wrapping_sub(self, other: Self) -> Self;

    /// Saturating subtraction.
    fn saturating_sub(self, other: Self) -> Self;

    /// Widens to `u64`.
    fn to_u64(self) -> u64;

    /// Narrows from `u64`, saturating at [`Counter::MAX`].
    fn saturating_from_u64(value: u64) -> Self;
}

macro_rules! impl_counter {
    ($($ty:ty),*) => {
        $(
            impl Counter for $ty {
                const ZERO: Self = 0;
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn wrapping_inc(self) -> Self {
                    <$ty>::wrapping_add(self, 1)
                }

                #[inline]
                fn wrapping_add(self, other: Self) -> Self {
                    <$ty>::wrapping_add(self, other)
                }

                #[inline]
                fn wrapping_sub(self, other: Self) -> Self {
                    <$ty>::wrapping_sub(self, other)
                }

                #[inline]
                fn saturating_sub(self, other: Self) -> Self {
                    <$ty>::saturating_sub(self, other)
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn saturating_from_u64(value: u64) -> Self {
                    <$ty>::try_from(value).unwrap_or(<$ty>::MAX)
                }
            }
        )*
    };
}

impl_counter!(u8, u16, u32, u64);

/// Elapsed milliseconds, stored at the counter's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Millis<C: Counter = u32>(pub C);

impl<C: Counter> TimeDuration for Millis<C> {
    const ZERO: Self = Millis(C::ZERO);

    fn as_millis(&self) -> u64 {
        self.0.to_u64()
    }

    fn from_millis(millis: u64) -> Self {
        Millis(C::saturating_from_u64(millis))
    }

    fn saturating_sub(self, other: Self) -> Self {
        Millis(self.0.saturating_sub(other.0))
    }
}

/// A reading of the tick counter.
///
/// Deliberately not `PartialOrd`: after a wraparound a later timestamp can be
/// numerically smaller, so ordering raw readings is meaningless. Use
/// [`TimeInstant::duration_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp<C: Counter = u32>(pub C);

impl<C: Counter> Timestamp<C> {
    /// Returns the raw counter value.
    pub fn ticks(&self) -> C {
        self.0
    }
}

impl<C: Counter> TimeInstant for Timestamp<C> {
    type Duration = Millis<C>;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        Millis(self.0.wrapping_sub(earlier.0))
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        Some(Timestamp(self.0.wrapping_add(duration.0)))
    }

    fn checked_sub(self, duration: Self::Duration) -> Option<Self> {
        Some(Timestamp(self.0.wrapping_sub(duration.0)))
    }
}

/// Interrupt-shared millisecond counter.
///
/// Meant to live in a `static`:
///
/// ```
/// use port_exercises::clock::TickCounter;
///
/// static MILLIS: TickCounter<u32> = TickCounter::new();
///
/// // Timer compare-match interrupt:
/// fn on_timer_compare() {
///     MILLIS.tick();
/// }
/// ```
pub struct TickCounter<C: Counter = u32> {
    ticks: Mutex<Cell<C>>,
}

impl<C: Counter> TickCounter<C> {
    /// Creates a counter starting at zero.
    pub const fn new() -> Self {
        Self {
            ticks: Mutex::new(Cell::new(C::ZERO)),
        }
    }

    /// Advances the counter by one tick. Call from the timer interrupt.
    pub fn tick(&self) {
        critical_section::with(|cs| {
            let ticks = self.ticks.borrow(cs);
            ticks.set(ticks.get().wrapping_inc());
        });
    }

    /// Returns the current tick count without tearing.
    pub fn now(&self) -> Timestamp<C> {
        critical_section::with(|cs| Timestamp(self.ticks.borrow(cs).get()))
    }
}

impl<C: Counter> Default for TickCounter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Counter> TimeSource<Timestamp<C>> for TickCounter<C> {
    fn now(&self) -> Timestamp<C> {
        TickCounter::now(self)
    }
}

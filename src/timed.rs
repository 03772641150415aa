//! Non-blocking timed actions.
//!
//! Each periodic routine owns an [`Interval`] and asks it every poll whether
//! its threshold has elapsed:
//!
//! ```
//! use port_exercises::clock::{Millis, Timestamp};
//! use port_exercises::timed::Interval;
//!
//! let mut blink = Interval::new(Timestamp::<u32>(0));
//! assert!(!blink.poll(Timestamp(499), Millis(500)));
//! assert!(blink.poll(Timestamp(500), Millis(500)));
//! assert!(!blink.poll(Timestamp(501), Millis(500)));
//! ```
//!
//! The check never waits. When the loop is late, the action fires once and is
//! re-armed from the current instant; missed periods are coalesced, not replayed.

use crate::time::TimeInstant;

/// Last-fired bookkeeping for one periodic action.
#[derive(Debug, Clone, Copy)]
pub struct Interval<I: TimeInstant> {
    last_fired: I,
}

impl<I: TimeInstant> Interval<I> {
    /// Creates an interval armed at `start`.
    pub fn new(start: I) -> Self {
        Self { last_fired: start }
    }

    /// Returns `true` at most once per `period`.
    ///
    /// Fires when at least `period` has elapsed since the last firing, then
    /// re-arms at `now`.
    pub fn poll(&mut self, now: I, period: I::Duration) -> bool {
        if now.duration_since(self.last_fired) >= period {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    /// Re-arms the interval at `now` without firing.
    pub fn restart(&mut self, now: I) {
        self.last_fired = now;
    }

    /// Time since the last firing (or since the interval was armed).
    pub fn elapsed(&self, now: I) -> I::Duration {
        now.duration_since(self.last_fired)
    }

    /// Instant of the last firing.
    pub fn last_fired(&self) -> I {
        self.last_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Millis, Timestamp};

    #[test]
    fn fires_on_threshold_not_before() {
        let mut interval = Interval::new(Timestamp::<u32>(100));

        assert!(!interval.poll(Timestamp(100), Millis(50)));
        assert!(!interval.poll(Timestamp(149), Millis(50)));
        assert!(interval.poll(Timestamp(150), Millis(50)));
        assert_eq!(interval.last_fired(), Timestamp(150));
    }

    #[test]
    fn fires_across_counter_wraparound() {
        let mut interval = Interval::new(Timestamp::<u8>(250));

        assert!(!interval.poll(Timestamp(4), Millis(20)));
        assert!(interval.poll(Timestamp(14), Millis(20)));
    }

    #[test]
    fn restart_rearms_without_firing() {
        let mut interval = Interval::new(Timestamp::<u32>(0));
        interval.restart(Timestamp(90));

        assert!(!interval.poll(Timestamp(100), Millis(50)));
        assert_eq!(interval.elapsed(Timestamp(100)), Millis(10));
        assert!(interval.poll(Timestamp(140), Millis(50)));
    }
}

//! Software debounce and press-edge detection.
//!
//! A [`ButtonChannel`] turns a noisy raw level into a stable pressed/released
//! state plus a one-shot "pressed" edge. Every change of the raw level restarts
//! the debounce window, so a bouncing contact only settles once it has been
//! quiet for longer than the full window.
//!
//! The pressed edge is latched until the consumer takes it. [`ButtonChannel::take_pressed`]
//! clears on read, which is the intended way to react to a press exactly once.
//! [`ButtonChannel::pressed_pending`] peeks without clearing for consumers that
//! wait for a release before acting.

use crate::config::{ButtonConfig, ConfigError};
use crate::port::{InputPort, Polarity};
use crate::time::{TimeDuration, TimeInstant};

/// Debounce state of one button.
#[derive(Debug, Clone, Copy)]
pub struct ButtonChannel<I: TimeInstant> {
    last_raw: bool,
    stable: bool,
    last_change: I,
    pressed_edge: bool,
    press_started: Option<I>,
}

impl<I: TimeInstant> ButtonChannel<I> {
    /// Creates a released channel.
    ///
    /// The channel starts released even if the button is already held, so a
    /// press at power-up is only reported after it has been stable for a full
    /// window.
    pub fn new(start: I) -> Self {
        Self {
            last_raw: false,
            stable: false,
            last_change: start,
            pressed_edge: false,
            press_started: None,
        }
    }

    /// Feeds one normalized sample (pressed = `true`).
    ///
    /// Returns `true` when this sample committed a new stable state.
    pub fn poll(&mut self, raw: bool, now: I, window: I::Duration) -> bool {
        if raw != self.last_raw {
            self.last_change = now;
        }
        self.last_raw = raw;

        if raw == self.stable || now.duration_since(self.last_change) <= window {
            return false;
        }

        self.stable = raw;
        if raw {
            self.pressed_edge = true;
            self.press_started = Some(now);
        } else {
            self.press_started = None;
        }
        true
    }

    /// Debounced level.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Whether a press edge is waiting to be consumed.
    #[inline]
    pub fn pressed_pending(&self) -> bool {
        self.pressed_edge
    }

    /// Consumes the press edge. Returns `true` once per press.
    #[inline]
    pub fn take_pressed(&mut self) -> bool {
        core::mem::take(&mut self.pressed_edge)
    }

    /// Drops a pending press edge.
    #[inline]
    pub fn clear_pressed(&mut self) {
        self.pressed_edge = false;
    }

    /// Instant the current stable press was committed.
    pub fn press_started(&self) -> Option<I> {
        self.press_started
    }

    /// How long the button has been stably pressed, `None` when released.
    pub fn held_for(&self, now: I) -> Option<I::Duration> {
        self.press_started.map(|start| now.duration_since(start))
    }
}

/// A set of buttons sampled from one input port.
pub struct ButtonBank<I: TimeInstant, const N: usize> {
    channels: [ButtonChannel<I>; N],
    pins: [u8; N],
    polarity: Polarity,
    window: I::Duration,
}

impl<I: TimeInstant, const N: usize> ButtonBank<I, N> {
    /// Creates a bank with every channel released.
    ///
    /// # Errors
    /// * `PinOutOfRange` - a pin is not a bit of an 8-bit port
    pub fn new(config: ButtonConfig<N>, start: I) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            channels: [ButtonChannel::new(start); N],
            pins: config.pins,
            polarity: config.polarity,
            window: I::Duration::from_millis(u64::from(config.debounce_ms)),
        })
    }

    /// Samples the port once and updates every channel.
    pub fn poll<P: InputPort>(&mut self, port: &mut P, now: I) {
        let levels = port.read();

        for (index, channel) in self.channels.iter_mut().enumerate() {
            let level = levels & (1 << self.pins[index]) != 0;
            let raw = self.polarity.is_asserted(level);
            if channel.poll(raw, now, self.window) {
                #[cfg(feature = "defmt")]
                defmt::trace!("button {} -> {}", index, if raw { "pressed" } else { "released" });
            }
        }
    }

    /// Returns a channel by index.
    pub fn channel(&self, index: usize) -> Option<&ButtonChannel<I>> {
        self.channels.get(index)
    }

    /// Returns a channel by index for edge consumption.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut ButtonChannel<I>> {
        self.channels.get_mut(index)
    }

    /// Debounce window applied to every channel.
    pub fn window(&self) -> I::Duration {
        self.window
    }

    /// Number of channels.
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the bank has no channels.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<I: TimeInstant, const N: usize> core::ops::Index<usize> for ButtonBank<I, N> {
    type Output = ButtonChannel<I>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.channels[index]
    }
}

impl<I: TimeInstant, const N: usize> core::ops::IndexMut<usize> for ButtonBank<I, N> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Millis, Timestamp};

    const WINDOW: Millis<u32> = Millis(50);

    fn at(ms: u32) -> Timestamp<u32> {
        Timestamp(ms)
    }

    #[test]
    fn starts_released_without_edge() {
        let channel = ButtonChannel::new(at(0));
        assert!(!channel.is_pressed());
        assert!(!channel.pressed_pending());
        assert_eq!(channel.press_started(), None);
    }

    #[test]
    fn commits_only_after_window_is_exceeded() {
        let mut channel = ButtonChannel::new(at(0));

        assert!(!channel.poll(true, at(10), WINDOW));
        assert!(!channel.poll(true, at(60), WINDOW));
        assert!(!channel.is_pressed());

        assert!(channel.poll(true, at(61), WINDOW));
        assert!(channel.is_pressed());
        assert!(channel.pressed_pending());
        assert_eq!(channel.press_started(), Some(at(61)));
    }

    #[test]
    fn every_bounce_restarts_window() {
        let mut channel = ButtonChannel::new(at(0));

        channel.poll(true, at(0), WINDOW);
        channel.poll(false, at(40), WINDOW);
        channel.poll(true, at(80), WINDOW);
        // 120ms since the first transition, but only 40ms of quiet.
        channel.poll(true, at(120), WINDOW);
        assert!(!channel.is_pressed());

        channel.poll(true, at(131), WINDOW);
        assert!(channel.is_pressed());
    }

    #[test]
    fn take_pressed_clears_on_read() {
        let mut channel = ButtonChannel::new(at(0));
        channel.poll(true, at(0), WINDOW);
        channel.poll(true, at(51), WINDOW);

        assert!(channel.take_pressed());
        assert!(!channel.take_pressed());

        channel.poll(true, at(500), WINDOW);
        assert!(!channel.pressed_pending());
    }

    #[test]
    fn release_commits_without_edge() {
        let mut channel = ButtonChannel::new(at(0));
        channel.poll(true, at(0), WINDOW);
        channel.poll(true, at(51), WINDOW);
        channel.clear_pressed();

        channel.poll(false, at(100), WINDOW);
        assert!(channel.poll(false, at(151), WINDOW));
        assert!(!channel.is_pressed());
        assert!(!channel.pressed_pending());
        assert_eq!(channel.held_for(at(200)), None);
    }

    #[test]
    fn held_for_measures_from_commit() {
        let mut channel = ButtonChannel::new(at(0));
        channel.poll(true, at(0), WINDOW);
        channel.poll(true, at(51), WINDOW);

        assert_eq!(channel.held_for(at(5051)), Some(Millis(5000)));
    }

    #[test]
    fn debounces_across_counter_wraparound() {
        let window = Millis::<u8>(50);
        let mut channel = ButtonChannel::new(Timestamp::<u8>(0));

        channel.poll(true, Timestamp(230), window);
        channel.poll(true, Timestamp(24), window);
        assert!(!channel.is_pressed());

        channel.poll(true, Timestamp(25), window);
        assert!(channel.is_pressed());
    }

    struct Pins(u8);

    impl InputPort for Pins {
        fn read(&mut self) -> u8 {
            self.0
        }
    }

    #[test]
    fn bank_maps_channels_to_configured_pins() {
        let mut bank = ButtonBank::new(ButtonConfig::new([2, 3, 4]), at(0)).unwrap();
        let mut pins = Pins(!(1 << 3));

        bank.poll(&mut pins, at(0));
        bank.poll(&mut pins, at(51));

        assert!(!bank.channel(0).unwrap().is_pressed());
        assert!(bank.channel(1).unwrap().is_pressed());
        assert!(!bank.channel(2).unwrap().is_pressed());
        assert!(bank.channel(3).is_none());

        assert!(bank.channel_mut(1).unwrap().take_pressed());
        assert!(!bank[1].pressed_pending());
        assert!(bank.channel_mut(3).is_none());
    }
}

//! Startup configuration: tick timer divisors and button wiring.
//!
//! Everything here is checked once before the loop starts. A configuration that
//! passes validation cannot fail later.

use crate::port::Polarity;

/// Debounce window used by the exercise board, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Clock prescaler of a 16-bit CTC timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl Prescaler {
    /// Returns the clock divisor.
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }
}

/// Tick timer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    /// CPU clock in Hz.
    pub cpu_hz: u32,
    /// Timer clock prescaler.
    pub prescaler: Prescaler,
    /// Desired interrupt rate in Hz.
    pub tick_hz: u32,
}

impl TimerConfig {
    /// ATmega328P at 16 MHz, prescaler 64, 1 ms ticks (compare value 249).
    pub const ATMEGA328P_1KHZ: TimerConfig = TimerConfig {
        cpu_hz: 16_000_000,
        prescaler: Prescaler::Div64,
        tick_hz: 1_000,
    };

    /// Computes the compare-match register value for CTC mode.
    ///
    /// The timer counts `0..=compare`, so the value is one less than the
    /// number of timer clocks per tick.
    ///
    /// # Errors
    /// * `ZeroClock` / `ZeroTickRate` - a rate of zero
    /// * `InexactRate` - the divided clock is not a multiple of the tick rate
    /// * `CompareOutOfRange` - the tick period does not fit a 16-bit register
    pub fn compare_value(&self) -> Result<u16, ConfigError> {
        if self.cpu_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        let timer_hz = self.cpu_hz / self.prescaler.divisor();
        if self.cpu_hz % self.prescaler.divisor() != 0 || timer_hz % self.tick_hz != 0 {
            return Err(ConfigError::InexactRate {
                cpu_hz: self.cpu_hz,
                prescaler: self.prescaler.divisor(),
                tick_hz: self.tick_hz,
            });
        }

        let ticks = timer_hz / self.tick_hz;
        if ticks == 0 || ticks > u32::from(u16::MAX) + 1 {
            return Err(ConfigError::CompareOutOfRange { ticks });
        }

        let compare = (ticks - 1) as u16;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tick timer: {} Hz / {} / {} Hz -> compare {}",
            self.cpu_hz,
            self.prescaler.divisor(),
            self.tick_hz,
            compare
        );

        Ok(compare)
    }
}

/// Wiring of a bank of buttons sharing one input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonConfig<const N: usize> {
    /// Input bit of each button, in channel order.
    pub pins: [u8; N],
    /// Level that means pressed.
    pub polarity: Polarity,
    /// Debounce window in milliseconds.
    pub debounce_ms: u32,
}

impl<const N: usize> ButtonConfig<N> {
    /// Creates an active-low configuration with the default debounce window.
    pub const fn new(pins: [u8; N]) -> Self {
        Self {
            pins,
            polarity: Polarity::ActiveLow,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    /// Sets the pressed polarity.
    pub const fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Sets the debounce window.
    pub const fn debounce_ms(mut self, debounce_ms: u32) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Bits of the input port carrying buttons. Pins above 7 are ignored.
    pub fn pin_mask(&self) -> u8 {
        self.pins
            .iter()
            .fold(0u8, |acc, &pin| acc | 1u8.checked_shl(u32::from(pin)).unwrap_or(0))
    }

    /// Bits whose pull-ups must be driven high while the buttons are read.
    ///
    /// Only active-low buttons idle on a pull-up; active-high buttons get none.
    pub fn pull_up_mask(&self) -> u8 {
        match self.polarity {
            Polarity::ActiveLow => self.pin_mask(),
            Polarity::ActiveHigh => 0x00,
        }
    }

    /// Checks that every pin is a bit of an 8-bit port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.pins.iter().find(|&&pin| pin > 7) {
            Some(&pin) => Err(ConfigError::PinOutOfRange { pin }),
            None => Ok(()),
        }
    }
}

/// Configuration errors, reported before the loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// CPU clock of zero Hz.
    ZeroClock,

    /// Tick rate of zero Hz.
    ZeroTickRate,

    /// Timer clocks per tick outside `1..=65536`.
    CompareOutOfRange { ticks: u32 },

    /// Divisors do not produce the tick rate exactly.
    InexactRate {
        cpu_hz: u32,
        prescaler: u32,
        tick_hz: u32,
    },

    /// Pin number is not a bit of an 8-bit port.
    PinOutOfRange { pin: u8 },

    /// Dispatcher built with room for no routine.
    NoActiveSlots,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroClock => write!(f, "CPU clock must be non-zero"),
            ConfigError::ZeroTickRate => write!(f, "tick rate must be non-zero"),
            ConfigError::CompareOutOfRange { ticks } => {
                write!(
                    f,
                    "{} timer clocks per tick does not fit a 16-bit compare register",
                    ticks
                )
            }
            ConfigError::InexactRate {
                cpu_hz,
                prescaler,
                tick_hz,
            } => {
                write!(
                    f,
                    "{} Hz / {} does not divide evenly into {} Hz ticks",
                    cpu_hz, prescaler, tick_hz
                )
            }
            ConfigError::PinOutOfRange { pin } => {
                write!(f, "pin {} is not a bit of an 8-bit port", pin)
            }
            ConfigError::NoActiveSlots => {
                write!(f, "dispatcher needs room for at least one routine")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

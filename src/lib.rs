#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`TimeSource`**: Trait to implement for your timing system; [`TickCounter`] is the interrupt-driven one
//! - **`Interval`**: Non-blocking "has this period elapsed" check, safe across counter wraparound
//! - **`ButtonChannel`** / **`ButtonBank`**: Debounced button state with consume-once press edges
//! - **`OutputPort`** / **`InputPort`**: Traits to implement for your 8-bit I/O ports
//! - **`Routine`**: One cooperative exercise, called once per loop iteration
//! - **`Dispatcher`**: Owns all loop state and runs the selected routines
//! - **`Showcase`**: Tours the LED exercises on a dispatcher, 2 s each with a blank pause between
//!
//! Time is counted in ticks of a free-running counter. All elapsed-time math
//! uses unsigned wrapping subtraction, so a counter of any width keeps working
//! after it wraps.

pub mod board;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod exercises;
pub mod port;
pub mod seven_segment;
pub mod showcase;
pub mod time;
pub mod timed;

pub use board::{DisplayDigits, Ports};
pub use clock::{Counter, Millis, TickCounter, Timestamp};
pub use config::{ButtonConfig, ConfigError, Prescaler, TimerConfig};
pub use debounce::{ButtonBank, ButtonChannel};
pub use dispatch::{DispatchError, Dispatcher, Exercise, ExerciseSelector};
pub use exercises::{Context, Routine};
pub use port::{InputPort, OutputPort, Polarity};
pub use showcase::Showcase;
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use timed::Interval;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_buttons_are_valid() {
        assert!(board::BUTTONS.validate().is_ok());
        assert_eq!(board::BUTTONS.polarity, Polarity::ActiveLow);
    }
}

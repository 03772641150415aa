//! Unattended tour of the LED exercises.
//!
//! [`Showcase`] drives a [`Dispatcher`]: it selects each LED exercise in code
//! order, lets it run for [`Showcase::EXERCISE_MS`], blanks every output for
//! [`Showcase::PAUSE_MS`] and moves on, wrapping after the last one. Both
//! phases are timed with an [`Interval`], so the pause never blocks the loop.

use crate::dispatch::{Dispatcher, Exercise};
use crate::exercises::millis;
use crate::port::{InputPort, OutputPort};
use crate::time::{TimeInstant, TimeSource};
use crate::timed::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Running,
    Pause,
}

/// Cycles through [`Showcase::SEQUENCE`] on top of a dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct Showcase<I: TimeInstant> {
    index: usize,
    stage: Stage,
    interval: Interval<I>,
}

impl<I: TimeInstant> Showcase<I> {
    /// Time each exercise runs before the pause.
    pub const EXERCISE_MS: u64 = 2000;

    /// Blank time between two exercises.
    pub const PAUSE_MS: u64 = 500;

    /// Exercises 1.2a to 1.2i, in the order they are shown.
    pub const SEQUENCE: [Exercise; 9] = [
        Exercise::FillRightToLeft,
        Exercise::FillLeftToRight,
        Exercise::Chaser,
        Exercise::PingPong,
        Exercise::Eraser,
        Exercise::FillFlash,
        Exercise::FillThenReverse,
        Exercise::CountUp,
        Exercise::CountDown,
    ];

    /// Selects the first exercise of the tour on `dispatcher`.
    pub fn start<T, P, IN, const N: usize>(dispatcher: &mut Dispatcher<'_, I, T, P, IN, N>) -> Self
    where
        T: TimeSource<I>,
        P: OutputPort,
        IN: InputPort,
    {
        let first = Self::SEQUENCE[0];
        dispatcher.select(first.code());

        Self {
            index: 0,
            stage: Stage::Running,
            interval: Interval::new(dispatcher.now()),
        }
    }

    /// The exercise being shown, `None` during the pause.
    pub fn current(&self) -> Option<Exercise> {
        match self.stage {
            Stage::Running => Some(Self::SEQUENCE[self.index]),
            Stage::Pause => None,
        }
    }

    /// One loop iteration: advances the tour when its phase is over, then
    /// polls the dispatcher.
    pub fn poll<T, P, IN, const N: usize>(&mut self, dispatcher: &mut Dispatcher<'_, I, T, P, IN, N>)
    where
        T: TimeSource<I>,
        P: OutputPort,
        IN: InputPort,
    {
        let period = match self.stage {
            Stage::Running => Self::EXERCISE_MS,
            Stage::Pause => Self::PAUSE_MS,
        };

        if self.interval.poll(dispatcher.now(), millis(period)) {
            match self.stage {
                Stage::Running => {
                    dispatcher.halt();
                    self.stage = Stage::Pause;
                }
                Stage::Pause => {
                    self.index = (self.index + 1) % Self::SEQUENCE.len();
                    let next = Self::SEQUENCE[self.index];
                    dispatcher.select(next.code());
                    self.stage = Stage::Running;

                    #[cfg(feature = "defmt")]
                    defmt::info!("showcase: {}", next);
                }
            }
        }

        dispatcher.poll();
    }

    /// Tours forever.
    pub fn run<T, P, IN, const N: usize>(
        &mut self,
        dispatcher: &mut Dispatcher<'_, I, T, P, IN, N>,
    ) -> !
    where
        T: TimeSource<I>,
        P: OutputPort,
        IN: InputPort,
    {
        loop {
            self.poll(dispatcher);
        }
    }
}

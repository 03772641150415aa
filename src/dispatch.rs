//! The cooperative poll loop.
//!
//! [`Dispatcher`] owns every piece of loop state: the debounced buttons, the
//! output ports, the shared display digits and the private state of each
//! exercise routine. One call to [`Dispatcher::poll`] is one loop iteration:
//! read the clock once, sample the buttons, then run each active routine in
//! activation order.

use heapless::Vec;

use crate::board::{BUTTON_COUNT, DisplayDigits, Ports};
use crate::config::{ButtonConfig, ConfigError};
use crate::debounce::ButtonBank;
use crate::exercises::{
    Accelerating, Alternating, BinaryCounter, Chaser, ClickSpeed, ComboLeds, Context,
    CountDirection, DirectionSequence, Eraser, ExclusiveOr, FillDirection, FillFlash, FillHold,
    FillThenReverse, HeldSequence, HexDisplay, ModeCycle, ModeDisplay, PingPong, Routine, Toggle,
    TwoSpeedBlink,
};
use crate::port::{InputPort, OutputPort};
use crate::time::{TimeInstant, TimeSource};

/// Every exercise the loop can run, with its numeric selector code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Exercise {
    Blink = 0,
    FillRightToLeft = 1,
    FillLeftToRight = 2,
    Chaser = 3,
    PingPong = 4,
    Eraser = 5,
    FillFlash = 6,
    FillThenReverse = 7,
    CountUp = 8,
    CountDown = 9,
    HexDisplay = 10,
    Toggle = 11,
    ModeCycle = 12,
    DirectionSequence = 13,
    Accelerating = 14,
    ClickSpeed = 15,
    ExclusiveOr = 16,
    Alternating = 17,
    HeldSequence = 18,
    ComboLeds = 19,
    ModeDisplay = 20,
}

impl Exercise {
    /// All exercises in code order.
    pub const ALL: [Exercise; 21] = [
        Exercise::Blink,
        Exercise::FillRightToLeft,
        Exercise::FillLeftToRight,
        Exercise::Chaser,
        Exercise::PingPong,
        Exercise::Eraser,
        Exercise::FillFlash,
        Exercise::FillThenReverse,
        Exercise::CountUp,
        Exercise::CountDown,
        Exercise::HexDisplay,
        Exercise::Toggle,
        Exercise::ModeCycle,
        Exercise::DirectionSequence,
        Exercise::Accelerating,
        Exercise::ClickSpeed,
        Exercise::ExclusiveOr,
        Exercise::Alternating,
        Exercise::HeldSequence,
        Exercise::ComboLeds,
        Exercise::ModeDisplay,
    ];

    /// Routine run when the selector holds an unknown code.
    pub const DEFAULT: Exercise = Exercise::Toggle;

    /// Looks up an exercise by selector code.
    pub fn from_code(code: u8) -> Option<Exercise> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Selector code of this exercise.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Mode value choosing the exercise the loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExerciseSelector {
    code: u8,
}

impl ExerciseSelector {
    /// Wraps a raw selector code; it is only checked by [`ExerciseSelector::resolve`].
    pub const fn new(code: u8) -> Self {
        Self { code }
    }

    /// The raw requested code.
    pub fn code(&self) -> u8 {
        self.code
    }

    /// Resolves the code, falling back to [`Exercise::DEFAULT`] when out of range.
    pub fn resolve(&self) -> Exercise {
        match Exercise::from_code(self.code) {
            Some(exercise) => exercise,
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "exercise code {} out of range, running {}",
                    self.code,
                    Exercise::DEFAULT
                );
                Exercise::DEFAULT
            }
        }
    }
}

impl Default for ExerciseSelector {
    fn default() -> Self {
        Self::new(Exercise::DEFAULT.code())
    }
}

/// Errors from changing the set of active routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The exercise is already running.
    AlreadyActive(Exercise),

    /// The exercise is not running.
    NotActive(Exercise),

    /// No room for another concurrent routine.
    ActiveSetFull,
}

impl core::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DispatchError::AlreadyActive(exercise) => {
                write!(f, "exercise {:?} is already active", exercise)
            }
            DispatchError::NotActive(exercise) => {
                write!(f, "exercise {:?} is not active", exercise)
            }
            DispatchError::ActiveSetFull => {
                write!(f, "active routine set is full")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DispatchError {}

/// Persistent state of every routine, statically allocated.
pub struct Routines<I: TimeInstant> {
    blink: TwoSpeedBlink<I>,
    fill_right_to_left: FillHold<I>,
    fill_left_to_right: FillHold<I>,
    chaser: Chaser<I>,
    ping_pong: PingPong<I>,
    eraser: Eraser<I>,
    fill_flash: FillFlash<I>,
    fill_then_reverse: FillThenReverse<I>,
    count_up: BinaryCounter<I>,
    count_down: BinaryCounter<I>,
    hex_display: HexDisplay<I>,
    toggle: Toggle,
    mode_cycle: ModeCycle<I>,
    direction_sequence: DirectionSequence<I>,
    accelerating: Accelerating<I>,
    click_speed: ClickSpeed<I>,
    exclusive_or: ExclusiveOr,
    alternating: Alternating<I>,
    held_sequence: HeldSequence<I>,
    combo_leds: ComboLeds,
    mode_display: ModeDisplay<I>,
}

impl<I: TimeInstant> Routines<I> {
    /// Creates every routine in its initial state, timers armed at `start`.
    pub fn new(start: I) -> Self {
        Self {
            blink: TwoSpeedBlink::new(start),
            fill_right_to_left: FillHold::new(start, FillDirection::RightToLeft),
            fill_left_to_right: FillHold::new(start, FillDirection::LeftToRight),
            chaser: Chaser::new(start),
            ping_pong: PingPong::new(start),
            eraser: Eraser::new(start),
            fill_flash: FillFlash::new(start),
            fill_then_reverse: FillThenReverse::new(start),
            count_up: BinaryCounter::new(start, CountDirection::Up),
            count_down: BinaryCounter::new(start, CountDirection::Down),
            hex_display: HexDisplay::new(start),
            toggle: Toggle::new(),
            mode_cycle: ModeCycle::new(start),
            direction_sequence: DirectionSequence::new(start),
            accelerating: Accelerating::new(start),
            click_speed: ClickSpeed::new(start),
            exclusive_or: ExclusiveOr,
            alternating: Alternating::new(start),
            held_sequence: HeldSequence::new(start),
            combo_leds: ComboLeds,
            mode_display: ModeDisplay::new(start),
        }
    }

    /// Puts one routine back into its initial state, timers armed at `now`.
    pub fn restart(&mut self, exercise: Exercise, now: I) {
        match exercise {
            Exercise::Blink => self.blink = TwoSpeedBlink::new(now),
            Exercise::FillRightToLeft => {
                self.fill_right_to_left = FillHold::new(now, FillDirection::RightToLeft)
            }
            Exercise::FillLeftToRight => {
                self.fill_left_to_right = FillHold::new(now, FillDirection::LeftToRight)
            }
            Exercise::Chaser => self.chaser = Chaser::new(now),
            Exercise::PingPong => self.ping_pong = PingPong::new(now),
            Exercise::Eraser => self.eraser = Eraser::new(now),
            Exercise::FillFlash => self.fill_flash = FillFlash::new(now),
            Exercise::FillThenReverse => self.fill_then_reverse = FillThenReverse::new(now),
            Exercise::CountUp => self.count_up = BinaryCounter::new(now, CountDirection::Up),
            Exercise::CountDown => self.count_down = BinaryCounter::new(now, CountDirection::Down),
            Exercise::HexDisplay => self.hex_display = HexDisplay::new(now),
            Exercise::Toggle => self.toggle = Toggle::new(),
            Exercise::ModeCycle => self.mode_cycle = ModeCycle::new(now),
            Exercise::DirectionSequence => self.direction_sequence = DirectionSequence::new(now),
            Exercise::Accelerating => self.accelerating = Accelerating::new(now),
            Exercise::ClickSpeed => self.click_speed = ClickSpeed::new(now),
            Exercise::ExclusiveOr => self.exclusive_or = ExclusiveOr,
            Exercise::Alternating => self.alternating = Alternating::new(now),
            Exercise::HeldSequence => self.held_sequence = HeldSequence::new(now),
            Exercise::ComboLeds => self.combo_leds = ComboLeds,
            Exercise::ModeDisplay => self.mode_display = ModeDisplay::new(now),
        }
    }

    /// Runs one routine for the current iteration.
    pub fn run<P: OutputPort>(&mut self, exercise: Exercise, ctx: &mut Context<'_, I, P>) {
        match exercise {
            Exercise::Blink => self.blink.run(ctx),
            Exercise::FillRightToLeft => self.fill_right_to_left.run(ctx),
            Exercise::FillLeftToRight => self.fill_left_to_right.run(ctx),
            Exercise::Chaser => self.chaser.run(ctx),
            Exercise::PingPong => self.ping_pong.run(ctx),
            Exercise::Eraser => self.eraser.run(ctx),
            Exercise::FillFlash => self.fill_flash.run(ctx),
            Exercise::FillThenReverse => self.fill_then_reverse.run(ctx),
            Exercise::CountUp => self.count_up.run(ctx),
            Exercise::CountDown => self.count_down.run(ctx),
            Exercise::HexDisplay => self.hex_display.run(ctx),
            Exercise::Toggle => Routine::<I>::run(&mut self.toggle, ctx),
            Exercise::ModeCycle => self.mode_cycle.run(ctx),
            Exercise::DirectionSequence => self.direction_sequence.run(ctx),
            Exercise::Accelerating => self.accelerating.run(ctx),
            Exercise::ClickSpeed => self.click_speed.run(ctx),
            Exercise::ExclusiveOr => Routine::<I>::run(&mut self.exclusive_or, ctx),
            Exercise::Alternating => self.alternating.run(ctx),
            Exercise::HeldSequence => self.held_sequence.run(ctx),
            Exercise::ComboLeds => Routine::<I>::run(&mut self.combo_leds, ctx),
            Exercise::ModeDisplay => self.mode_display.run(ctx),
        }
    }
}

/// Runs the selected exercise routines from a single poll loop.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `P` - Output port implementation type
/// * `IN` - Input port the buttons are wired to
/// * `N` - Maximum number of concurrently active routines
pub struct Dispatcher<'t, I, T, P, IN, const N: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
    P: OutputPort,
    IN: InputPort,
{
    time_source: &'t T,
    input: IN,
    buttons: ButtonBank<I, BUTTON_COUNT>,
    ports: Ports<P>,
    digits: DisplayDigits,
    routines: Routines<I>,
    selector: ExerciseSelector,
    active: Vec<Exercise, N>,
}

impl<'t, I, T, P, IN, const N: usize> Dispatcher<'t, I, T, P, IN, N>
where
    I: TimeInstant,
    T: TimeSource<I>,
    P: OutputPort,
    IN: InputPort,
{
    /// Creates an idle dispatcher. Nothing runs until an exercise is
    /// selected or activated.
    ///
    /// The control port pull-ups are taken from `buttons`.
    ///
    /// # Errors
    /// * `PinOutOfRange` - a button pin is not a bit of an 8-bit port
    /// * `NoActiveSlots` - `N` is zero, so no routine could ever run
    pub fn new(
        mut ports: Ports<P>,
        input: IN,
        buttons: ButtonConfig<BUTTON_COUNT>,
        time_source: &'t T,
    ) -> Result<Self, ConfigError> {
        if N == 0 {
            return Err(ConfigError::NoActiveSlots);
        }

        let start = time_source.now();
        let bank = ButtonBank::new(buttons, start)?;
        ports.set_pull_ups(buttons.pull_up_mask());

        Ok(Self {
            time_source,
            input,
            buttons: bank,
            ports,
            digits: DisplayDigits::default(),
            routines: Routines::new(start),
            selector: ExerciseSelector::default(),
            active: Vec::new(),
        })
    }

    /// Switches to a single exercise chosen by selector code.
    ///
    /// Out-of-range codes fall back to [`Exercise::DEFAULT`]. Outputs are
    /// reset and the routine starts from its initial state.
    pub fn select(&mut self, code: u8) -> Exercise {
        self.selector = ExerciseSelector::new(code);
        let exercise = self.selector.resolve();

        self.halt();

        // `new` rejects N == 0, so a cleared set always has room
        if self.active.push(exercise).is_ok() {
            self.routines.restart(exercise, self.time_source.now());

            #[cfg(feature = "defmt")]
            defmt::info!("selected {}", exercise);
        }
        exercise
    }

    /// Stops every routine, turns all outputs off and resets the digits.
    pub fn halt(&mut self) {
        self.active.clear();
        self.ports.reset();
        self.digits = DisplayDigits::default();
    }

    /// Adds a routine to run alongside the active ones.
    ///
    /// # Errors
    /// * `AlreadyActive` - the routine is already running
    /// * `ActiveSetFull` - `N` routines are already running
    pub fn activate(&mut self, exercise: Exercise) -> Result<(), DispatchError> {
        if self.active.contains(&exercise) {
            return Err(DispatchError::AlreadyActive(exercise));
        }

        self.active
            .push(exercise)
            .map_err(|_| DispatchError::ActiveSetFull)?;
        self.routines.restart(exercise, self.time_source.now());

        #[cfg(feature = "defmt")]
        defmt::info!("activated {}", exercise);
        Ok(())
    }

    /// Stops a running routine. Its outputs keep their last state.
    ///
    /// # Errors
    /// * `NotActive` - the routine is not running
    pub fn deactivate(&mut self, exercise: Exercise) -> Result<(), DispatchError> {
        let index = self
            .active
            .iter()
            .position(|&active| active == exercise)
            .ok_or(DispatchError::NotActive(exercise))?;
        self.active.remove(index);

        #[cfg(feature = "defmt")]
        defmt::info!("deactivated {}", exercise);
        Ok(())
    }

    /// One loop iteration. Never blocks.
    pub fn poll(&mut self) {
        let now = self.time_source.now();
        self.buttons.poll(&mut self.input, now);

        let mut ctx = Context {
            now,
            buttons: &mut self.buttons,
            ports: &mut self.ports,
            digits: &mut self.digits,
        };

        for &exercise in self.active.iter() {
            self.routines.run(exercise, &mut ctx);
        }
    }

    /// Polls forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    /// Current instant of the dispatcher's time source.
    pub fn now(&self) -> I {
        self.time_source.now()
    }

    /// Routines currently running, in activation order.
    pub fn active(&self) -> &[Exercise] {
        &self.active
    }

    /// The last selector value passed to [`Dispatcher::select`].
    pub fn selector(&self) -> ExerciseSelector {
        self.selector
    }

    /// Output banks as last written.
    pub fn ports(&self) -> &Ports<P> {
        &self.ports
    }

    /// Output banks, for bits no routine drives.
    pub fn ports_mut(&mut self) -> &mut Ports<P> {
        &mut self.ports
    }

    /// Input port the buttons are sampled from.
    pub fn input_mut(&mut self) -> &mut IN {
        &mut self.input
    }

    /// Debounced button state as of the last poll.
    pub fn buttons(&self) -> &ButtonBank<I, BUTTON_COUNT> {
        &self.buttons
    }

    /// Digits shared by the display routines.
    pub fn digits(&self) -> DisplayDigits {
        self.digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for exercise in Exercise::ALL {
            assert_eq!(Exercise::from_code(exercise.code()), Some(exercise));
        }
    }

    #[test]
    fn selector_falls_back_on_unknown_code() {
        assert_eq!(ExerciseSelector::new(21).resolve(), Exercise::DEFAULT);
        assert_eq!(ExerciseSelector::new(255).resolve(), Exercise::DEFAULT);
        assert_eq!(ExerciseSelector::new(4).resolve(), Exercise::PingPong);
    }

    #[test]
    fn default_selector_runs_default_exercise() {
        assert_eq!(ExerciseSelector::default().resolve(), Exercise::DEFAULT);
    }
}

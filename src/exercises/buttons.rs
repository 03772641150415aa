//! Button-driven LED behaviours.
//!
//! Routines that react to a click consume the press edge with
//! [`take_pressed`](crate::debounce::ButtonChannel::take_pressed). Routines that
//! follow the held level read [`is_pressed`](crate::debounce::ButtonChannel::is_pressed)
//! and leave edges alone.

use super::{Context, Routine, millis};
use crate::board::{BUTTON_LED_1, BUTTON_LED_2, COMBO_MASK, SEQUENCE_MASK};
use crate::port::OutputPort;
use crate::time::{TimeDuration, TimeInstant};
use crate::timed::Interval;

const FIRST: usize = 0;
const SECOND: usize = 1;
const THIRD: usize = 2;

/// Lights one of the three sequence LEDs (bits 0..=2), clearing the others.
fn light_sequence<P: OutputPort>(bar: &mut P, index: u8, reversed: bool) {
    let bit = if reversed { 2 - index } else { index };
    bar.modify(SEQUENCE_MASK, 1 << bit);
}

/// Each click toggles the LED.
#[derive(Debug, Default)]
pub struct Toggle {
    lit: bool,
}

impl Toggle {
    pub const fn new() -> Self {
        Self { lit: false }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl<I: TimeInstant> Routine<I> for Toggle {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if ctx.buttons[FIRST].take_pressed() {
            self.lit = !self.lit;
        }
        ctx.ports.bar.put_bit(BUTTON_LED_1, self.lit);
    }
}

/// LED state selected by [`ModeCycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    Off,
    On,
    Blink,
    FastBlink,
}

impl LedMode {
    /// The mode after one click.
    pub fn next(self) -> Self {
        match self {
            LedMode::Off => LedMode::On,
            LedMode::On => LedMode::Blink,
            LedMode::Blink => LedMode::FastBlink,
            LedMode::FastBlink => LedMode::Off,
        }
    }
}

/// Clicks cycle the LED through off, on, blinking and fast blinking.
pub struct ModeCycle<I: TimeInstant> {
    blink: Interval<I>,
    mode: LedMode,
}

impl<I: TimeInstant> ModeCycle<I> {
    pub const BLINK_MS: u64 = 500;
    pub const FAST_BLINK_MS: u64 = 100;

    pub fn new(start: I) -> Self {
        Self {
            blink: Interval::new(start),
            mode: LedMode::Off,
        }
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }
}

impl<I: TimeInstant> Routine<I> for ModeCycle<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if ctx.buttons[FIRST].take_pressed() {
            self.mode = self.mode.next();
            self.blink.restart(ctx.now);
        }

        let period = match self.mode {
            LedMode::Off => {
                ctx.ports.bar.clear_bit(BUTTON_LED_1);
                return;
            }
            LedMode::On => {
                ctx.ports.bar.set_bit(BUTTON_LED_1);
                return;
            }
            LedMode::Blink => Self::BLINK_MS,
            LedMode::FastBlink => Self::FAST_BLINK_MS,
        };

        if self.blink.poll(ctx.now, millis(period)) {
            ctx.ports.bar.toggle_bit(BUTTON_LED_1);
        }
    }
}

/// Runs 1-2-3 across three LEDs; each click reverses to 3-2-1 and back.
pub struct DirectionSequence<I: TimeInstant> {
    step: Interval<I>,
    index: u8,
    reversed: bool,
}

impl<I: TimeInstant> DirectionSequence<I> {
    pub const STEP_MS: u64 = 500;

    pub fn new(start: I) -> Self {
        Self {
            step: Interval::new(start),
            index: 0,
            reversed: false,
        }
    }
}

impl<I: TimeInstant> Routine<I> for DirectionSequence<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if ctx.buttons[FIRST].take_pressed() {
            self.reversed = !self.reversed;
            self.index = 0;
        }

        if self.step.poll(ctx.now, millis(Self::STEP_MS)) {
            light_sequence(&mut ctx.ports.bar, self.index, self.reversed);
            self.index = (self.index + 1) % 3;
        }
    }
}

/// While held, the LED blinks faster and faster until it stays lit.
pub struct Accelerating<I: TimeInstant> {
    blink: Interval<I>,
    ramp: Interval<I>,
    period_ms: u16,
}

impl<I: TimeInstant> Accelerating<I> {
    pub const START_MS: u16 = 500;
    /// Period reduction applied every [`Self::RAMP_MS`] while held.
    pub const STEP_MS: u16 = 5;
    pub const RAMP_MS: u64 = 10;
    /// At or below this period the LED stays solid.
    pub const SOLID_MS: u16 = 10;

    pub fn new(start: I) -> Self {
        Self {
            blink: Interval::new(start),
            ramp: Interval::new(start),
            period_ms: Self::START_MS,
        }
    }

    /// Current blink period, zero once solid.
    pub fn period_ms(&self) -> u16 {
        self.period_ms
    }
}

impl<I: TimeInstant> Routine<I> for Accelerating<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        if !ctx.buttons[FIRST].is_pressed() {
            ctx.ports.bar.clear_bit(BUTTON_LED_1);
            self.period_ms = Self::START_MS;
            self.ramp.restart(ctx.now);
            return;
        }

        if self.ramp.poll(ctx.now, millis(Self::RAMP_MS)) {
            self.period_ms = if self.period_ms > Self::SOLID_MS {
                self.period_ms - Self::STEP_MS
            } else {
                0
            };
        }

        if self.period_ms == 0 {
            ctx.ports.bar.set_bit(BUTTON_LED_1);
        } else if self.blink.poll(ctx.now, millis(u64::from(self.period_ms))) {
            ctx.ports.bar.toggle_bit(BUTTON_LED_1);
        }
    }
}

/// Each click steps the blink rate up; holding for five seconds switches off.
pub struct ClickSpeed<I: TimeInstant> {
    blink: Interval<I>,
    level: usize,
}

impl<I: TimeInstant> ClickSpeed<I> {
    /// Blink periods for levels `1..=5`; level 0 is off.
    pub const PERIODS_MS: [u64; 5] = [1000, 500, 250, 100, 50];
    pub const HOLD_OFF_MS: u64 = 5000;

    pub fn new(start: I) -> Self {
        Self {
            blink: Interval::new(start),
            level: 0,
        }
    }

    /// Current speed level, 0 when off.
    pub fn level(&self) -> usize {
        self.level
    }
}

impl<I: TimeInstant> Routine<I> for ClickSpeed<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let button = &mut ctx.buttons[FIRST];

        // A click counts on release, so a long hold never bumps the level.
        if button.pressed_pending() && !button.is_pressed() {
            button.clear_pressed();
            self.level = (self.level + 1) % (Self::PERIODS_MS.len() + 1);
        }

        if let Some(held) = button.held_for(ctx.now) {
            if held >= I::Duration::from_millis(Self::HOLD_OFF_MS) {
                self.level = 0;
                button.clear_pressed();
            }
        }

        match self.level {
            0 => ctx.ports.bar.clear_bit(BUTTON_LED_1),
            level => {
                if self.blink.poll(ctx.now, millis(Self::PERIODS_MS[level - 1])) {
                    ctx.ports.bar.toggle_bit(BUTTON_LED_1);
                }
            }
        }
    }
}

/// LED lit while exactly one of two buttons is held.
#[derive(Debug, Default)]
pub struct ExclusiveOr;

impl<I: TimeInstant> Routine<I> for ExclusiveOr {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let lit = ctx.buttons[FIRST].is_pressed() ^ ctx.buttons[SECOND].is_pressed();
        ctx.ports.bar.put_bit(BUTTON_LED_1, lit);
    }
}

/// Which LED stays lit in [`Alternating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lead {
    First,
    Second,
}

/// One LED steady and the other blinking; the buttons choose which is which,
/// both held switches both off.
pub struct Alternating<I: TimeInstant> {
    blink: Interval<I>,
    lead: Lead,
}

impl<I: TimeInstant> Alternating<I> {
    pub const BLINK_MS: u64 = 300;

    pub fn new(start: I) -> Self {
        Self {
            blink: Interval::new(start),
            lead: Lead::First,
        }
    }

    pub fn lead(&self) -> Lead {
        self.lead
    }
}

impl<I: TimeInstant> Routine<I> for Alternating<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let bar = &mut ctx.ports.bar;

        if ctx.buttons[FIRST].is_pressed() && ctx.buttons[SECOND].is_pressed() {
            bar.clear_bit(BUTTON_LED_1);
            bar.clear_bit(BUTTON_LED_2);
            return;
        }

        if ctx.buttons[FIRST].take_pressed() {
            self.lead = Lead::First;
        }
        if ctx.buttons[SECOND].take_pressed() {
            self.lead = Lead::Second;
        }

        let (steady, blinking) = match self.lead {
            Lead::First => (BUTTON_LED_1, BUTTON_LED_2),
            Lead::Second => (BUTTON_LED_2, BUTTON_LED_1),
        };

        bar.set_bit(steady);
        if self.blink.poll(ctx.now, millis(Self::BLINK_MS)) {
            bar.toggle_bit(blinking);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Stopped,
    Ascending,
    Descending,
}

/// Holding the first button runs 1-2-3, the second 3-2-1, both stops and clears.
pub struct HeldSequence<I: TimeInstant> {
    step: Interval<I>,
    index: u8,
    sweep: Sweep,
}

impl<I: TimeInstant> HeldSequence<I> {
    pub const STEP_MS: u64 = 400;

    pub fn new(start: I) -> Self {
        Self {
            step: Interval::new(start),
            index: 0,
            sweep: Sweep::Stopped,
        }
    }
}

impl<I: TimeInstant> Routine<I> for HeldSequence<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let first = ctx.buttons[FIRST].is_pressed();
        let second = ctx.buttons[SECOND].is_pressed();

        match (first, second) {
            (true, true) => {
                ctx.ports.bar.modify(SEQUENCE_MASK, 0x00);
                self.sweep = Sweep::Stopped;
            }
            (true, false) => self.sweep = Sweep::Ascending,
            (false, true) => self.sweep = Sweep::Descending,
            (false, false) => {}
        }

        if self.sweep == Sweep::Stopped {
            return;
        }

        if self.step.poll(ctx.now, millis(Self::STEP_MS)) {
            light_sequence(&mut ctx.ports.bar, self.index, self.sweep == Sweep::Descending);
            self.index = (self.index + 1) % 3;
        }
    }
}

/// Buttons select LED groups: first lights all four, second the lower pair,
/// third the upper pair, first and third together clear. The last pattern
/// stays when buttons are released.
#[derive(Debug, Default)]
pub struct ComboLeds;

impl<I: TimeInstant> Routine<I> for ComboLeds {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        let pattern = match (
            ctx.buttons[FIRST].is_pressed(),
            ctx.buttons[SECOND].is_pressed(),
            ctx.buttons[THIRD].is_pressed(),
        ) {
            (true, _, true) => 0x00,
            (true, _, _) => 0x0F,
            (_, true, _) => 0x03,
            (_, _, true) => 0x0C,
            _ => return,
        };
        ctx.ports.bar.modify(COMBO_MASK, pattern);
    }
}

/// Each button selects a scene for three LEDs and shows its number on the
/// left display digit.
///
/// | Scene | LED 0 | LED 1 | LED 2 |
/// |-------|-------|-------|-------|
/// | 1     | on    | off   | blink |
/// | 2     | off   | on    | on    |
/// | 3     | blink | blink | off   |
pub struct ModeDisplay<I: TimeInstant> {
    blink: Interval<I>,
    scene: u8,
}

impl<I: TimeInstant> ModeDisplay<I> {
    pub const BLINK_MS: u64 = 300;

    pub fn new(start: I) -> Self {
        Self {
            blink: Interval::new(start),
            scene: 0,
        }
    }

    /// Selected scene, 0 before the first click.
    pub fn scene(&self) -> u8 {
        self.scene
    }
}

impl<I: TimeInstant> Routine<I> for ModeDisplay<I> {
    fn run<P: OutputPort>(&mut self, ctx: &mut Context<'_, I, P>) {
        for (button, scene) in [(FIRST, 1), (SECOND, 2), (THIRD, 3)] {
            if ctx.buttons[button].take_pressed() {
                self.scene = scene;
            }
        }

        ctx.digits.left = self.scene;

        let bar = &mut ctx.ports.bar;
        match self.scene {
            1 => {
                bar.set_bit(0);
                bar.clear_bit(1);
                if self.blink.poll(ctx.now, millis(Self::BLINK_MS)) {
                    bar.toggle_bit(2);
                }
            }
            2 => {
                bar.clear_bit(0);
                bar.set_bit(1);
                bar.set_bit(2);
            }
            3 => {
                bar.clear_bit(2);
                if self.blink.poll(ctx.now, millis(Self::BLINK_MS)) {
                    bar.toggle_bit(0);
                    bar.toggle_bit(1);
                }
            }
            _ => bar.modify(SEQUENCE_MASK, 0x00),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BUTTON_COUNT, BUTTON_PINS, BUTTONS, DisplayDigits, Ports};
    use crate::clock::Timestamp;
    use crate::debounce::ButtonBank;
    use crate::port::InputPort;

    struct Latch(u8);

    impl OutputPort for Latch {
        fn write(&mut self, value: u8) {
            self.0 = value;
        }

        fn latch(&self) -> u8 {
            self.0
        }
    }

    struct Pins(u8);

    impl InputPort for Pins {
        fn read(&mut self) -> u8 {
            self.0
        }
    }

    /// One routine on its own board, polled in 1 ms steps.
    struct Bench {
        now: u32,
        pins: Pins,
        buttons: ButtonBank<Timestamp<u32>, BUTTON_COUNT>,
        ports: Ports<Latch>,
        digits: DisplayDigits,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                now: 0,
                pins: Pins(0xFF),
                buttons: ButtonBank::new(BUTTONS, Timestamp(0)).unwrap(),
                ports: Ports::new(Latch(0), Latch(0), Latch(0)),
                digits: DisplayDigits::default(),
            }
        }

        fn step<R: Routine<Timestamp<u32>>>(&mut self, routine: &mut R, millis: u32) {
            for _ in 0..millis {
                self.now += 1;
                let now = Timestamp(self.now);
                self.buttons.poll(&mut self.pins, now);

                let mut ctx = Context {
                    now,
                    buttons: &mut self.buttons,
                    ports: &mut self.ports,
                    digits: &mut self.digits,
                };
                routine.run(&mut ctx);
            }
        }

        fn press<R: Routine<Timestamp<u32>>>(&mut self, routine: &mut R, button: usize) {
            self.pins.0 &= !(1 << BUTTON_PINS[button]);
            self.step(routine, 60);
        }

        fn release<R: Routine<Timestamp<u32>>>(&mut self, routine: &mut R, button: usize) {
            self.pins.0 |= 1 << BUTTON_PINS[button];
            self.step(routine, 60);
        }

        fn click<R: Routine<Timestamp<u32>>>(&mut self, routine: &mut R, button: usize) {
            self.press(routine, button);
            self.release(routine, button);
        }

        fn bar_bit(&self, bit: u8) -> bool {
            self.ports.bar.is_set(bit)
        }
    }

    #[test]
    fn toggle_flips_on_each_click() {
        let mut bench = Bench::new();
        let mut toggle = Toggle::new();

        bench.step(&mut toggle, 10);
        assert!(!toggle.is_lit());

        bench.click(&mut toggle, FIRST);
        assert!(toggle.is_lit());
        assert!(bench.bar_bit(BUTTON_LED_1));

        bench.click(&mut toggle, FIRST);
        assert!(!toggle.is_lit());
        assert!(!bench.bar_bit(BUTTON_LED_1));
    }

    #[test]
    fn mode_cycle_walks_all_modes() {
        let mut bench = Bench::new();
        let mut cycle = ModeCycle::new(Timestamp(0));
        assert_eq!(cycle.mode(), LedMode::Off);

        for expected in [LedMode::On, LedMode::Blink, LedMode::FastBlink, LedMode::Off] {
            bench.click(&mut cycle, FIRST);
            assert_eq!(cycle.mode(), expected);
        }
        assert!(!bench.bar_bit(BUTTON_LED_1));
    }

    #[test]
    fn accelerating_ramps_while_held_and_resets_on_release() {
        let mut bench = Bench::new();
        let mut blink = Accelerating::new(Timestamp(0));

        // Committed at 52 ms, first ramp step 10 ms later
        bench.press(&mut blink, FIRST);
        assert_eq!(blink.period_ms(), 500);

        bench.step(&mut blink, 100);
        assert_eq!(blink.period_ms(), 450);

        bench.step(&mut blink, 1000);
        assert_eq!(blink.period_ms(), 0);
        assert!(bench.bar_bit(BUTTON_LED_1));

        bench.release(&mut blink, FIRST);
        assert_eq!(blink.period_ms(), Accelerating::<Timestamp<u32>>::START_MS);
        assert!(!bench.bar_bit(BUTTON_LED_1));
    }

    #[test]
    fn click_speed_levels_wrap_and_long_hold_switches_off() {
        let mut bench = Bench::new();
        let mut speed = ClickSpeed::new(Timestamp(0));

        for level in 1..=5 {
            bench.click(&mut speed, FIRST);
            assert_eq!(speed.level(), level);
        }
        bench.click(&mut speed, FIRST);
        assert_eq!(speed.level(), 0);

        bench.click(&mut speed, FIRST);
        assert_eq!(speed.level(), 1);

        bench.press(&mut speed, FIRST);
        bench.step(&mut speed, 5000);
        assert_eq!(speed.level(), 0);
        bench.release(&mut speed, FIRST);
        assert_eq!(speed.level(), 0);
    }

    #[test]
    fn alternating_lead_follows_last_click() {
        let mut bench = Bench::new();
        let mut alternating = Alternating::new(Timestamp(0));
        assert_eq!(alternating.lead(), Lead::First);

        bench.click(&mut alternating, SECOND);
        assert_eq!(alternating.lead(), Lead::Second);
        assert!(bench.bar_bit(BUTTON_LED_2));

        bench.click(&mut alternating, FIRST);
        assert_eq!(alternating.lead(), Lead::First);
        assert!(bench.bar_bit(BUTTON_LED_1));
    }

    #[test]
    fn mode_display_scene_tracks_last_button() {
        let mut bench = Bench::new();
        let mut display = ModeDisplay::new(Timestamp(0));
        assert_eq!(display.scene(), 0);

        bench.click(&mut display, THIRD);
        assert_eq!(display.scene(), 3);
        assert_eq!(bench.digits.left, 3);

        bench.click(&mut display, FIRST);
        assert_eq!(display.scene(), 1);
        assert_eq!(bench.digits.left, 1);
        assert!(bench.bar_bit(0));
    }
}

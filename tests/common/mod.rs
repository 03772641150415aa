//! Shared test infrastructure for port-exercises integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;

use port_exercises::board::{self, BUTTON_COUNT};
use port_exercises::{
    ButtonConfig, Counter, Dispatcher, InputPort, Millis, OutputPort, Ports,
    Showcase, TimeSource, Timestamp,
};

// ============================================================================
// Manual Clock
// ============================================================================

/// Time source advanced by hand, generic over the counter width
pub struct ManualClock<C: Counter = u32> {
    current: Cell<Timestamp<C>>,
}

impl<C: Counter> ManualClock<C> {
    pub fn new() -> Self {
        Self::starting_at(C::ZERO)
    }

    pub fn starting_at(ticks: C) -> Self {
        Self {
            current: Cell::new(Timestamp(ticks)),
        }
    }

    /// Advance time by the given number of milliseconds, wrapping like the hardware counter
    pub fn advance(&self, millis: u64) {
        let current = self.current.get();
        let step = C::saturating_from_u64(millis);
        self.current.set(Timestamp(current.0.wrapping_add(step)));
    }

    pub fn set_time(&self, ticks: C) {
        self.current.set(Timestamp(ticks));
    }

    pub fn ticks(&self) -> C {
        self.current.get().0
    }
}

impl<C: Counter> TimeSource<Timestamp<C>> for ManualClock<C> {
    fn now(&self) -> Timestamp<C> {
        self.current.get()
    }
}

pub fn ms(millis: u32) -> Millis<u32> {
    Millis(millis)
}

// ============================================================================
// Recording Output Port
// ============================================================================

/// Output port that remembers every value written to it
#[derive(Debug, Default)]
pub struct RecordingPort {
    latch: u8,
    writes: heapless::Vec<u8, 256>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u8 {
        self.latch
    }

    pub fn bit(&self, bit: u8) -> bool {
        self.latch & (1 << bit) != 0
    }

    pub fn writes(&self) -> &[u8] {
        &self.writes
    }

    pub fn clear_history(&mut self) {
        self.writes.clear();
    }
}

impl OutputPort for RecordingPort {
    fn write(&mut self, value: u8) {
        self.latch = value;
        // History is best-effort; long runs only care about the latch
        let _ = self.writes.push(value);
    }

    fn latch(&self) -> u8 {
        self.latch
    }
}

// ============================================================================
// Scripted Input Port
// ============================================================================

/// Input port with pins set by the test. Idle level is all high (pull-ups).
#[derive(Debug)]
pub struct ScriptedInput {
    level: u8,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self { level: 0xFF }
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level;
    }

    /// Pulls a board button low (pressed)
    pub fn press(&mut self, button: usize) {
        self.level &= !(1 << board::BUTTON_PINS[button]);
    }

    /// Releases a board button back to the pull-up level
    pub fn release(&mut self, button: usize) {
        self.level |= 1 << board::BUTTON_PINS[button];
    }
}

impl InputPort for ScriptedInput {
    fn read(&mut self) -> u8 {
        self.level
    }
}

// ============================================================================
// Dispatcher Helpers
// ============================================================================

pub type TestDispatcher<'t> =
    Dispatcher<'t, Timestamp<u32>, ManualClock<u32>, RecordingPort, ScriptedInput, 4>;

pub fn dispatcher(clock: &ManualClock<u32>) -> TestDispatcher<'_> {
    dispatcher_with(clock, board::BUTTONS)
}

/// Dispatcher reading buttons wired as `buttons` describes
pub fn dispatcher_with(
    clock: &ManualClock<u32>,
    buttons: ButtonConfig<BUTTON_COUNT>,
) -> TestDispatcher<'_> {
    let ports = Ports::new(RecordingPort::new(), RecordingPort::new(), RecordingPort::new());
    Dispatcher::new(ports, ScriptedInput::new(), buttons, clock).unwrap()
}

/// Advance the clock in 1 ms steps, polling after each step
pub fn run_for(dispatcher: &mut TestDispatcher<'_>, clock: &ManualClock<u32>, millis: u64) {
    for _ in 0..millis {
        clock.advance(1);
        dispatcher.poll();
    }
}

/// Press a button and hold it long enough to pass the debounce window
pub fn press(dispatcher: &mut TestDispatcher<'_>, clock: &ManualClock<u32>, button: usize) {
    dispatcher.input_mut().press(button);
    run_for(dispatcher, clock, 60);
}

/// Release a button and wait out the debounce window
pub fn release(dispatcher: &mut TestDispatcher<'_>, clock: &ManualClock<u32>, button: usize) {
    dispatcher.input_mut().release(button);
    run_for(dispatcher, clock, 60);
}

/// Poll for `millis` and count how often `bit` of the bar changed
pub fn bar_bit_changes(
    dispatcher: &mut TestDispatcher<'_>,
    clock: &ManualClock<u32>,
    bit: u8,
    millis: u64,
) -> usize {
    let mut last = dispatcher.ports().bar.bit(bit);
    let mut changes = 0;
    for _ in 0..millis {
        clock.advance(1);
        dispatcher.poll();
        let now = dispatcher.ports().bar.bit(bit);
        if now != last {
            changes += 1;
            last = now;
        }
    }
    changes
}

/// A complete debounced click
pub fn click(dispatcher: &mut TestDispatcher<'_>, clock: &ManualClock<u32>, button: usize) {
    press(dispatcher, clock, button);
    release(dispatcher, clock, button);
}

/// Advance the clock in 1 ms steps, polling the showcase after each step
pub fn tour_for(
    showcase: &mut Showcase<Timestamp<u32>>,
    dispatcher: &mut TestDispatcher<'_>,
    clock: &ManualClock<u32>,
    millis: u64,
) {
    for _ in 0..millis {
        clock.advance(1);
        showcase.poll(dispatcher);
    }
}

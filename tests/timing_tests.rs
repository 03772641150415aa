mod common;

use common::*;
use port_exercises::{Interval, Millis, TickCounter, TimeInstant, TimeSource, Timestamp};

#[test]
fn elapsed_is_correct_across_wraparound() {
    let before = Timestamp(250u8);
    let after = Timestamp(14u8);

    assert_eq!(after.duration_since(before), Millis(20));
}

#[test]
fn tick_counter_wraps_without_losing_elapsed_time() {
    let counter = TickCounter::<u16>::new();
    for _ in 0..65_000 {
        counter.tick();
    }
    let start = counter.now();

    for _ in 0..1_000 {
        counter.tick();
    }

    assert_eq!(counter.now(), Timestamp(464));
    assert_eq!(counter.now().duration_since(start), Millis(1_000));
}

#[test]
fn interval_fires_between_one_and_two_periods() {
    let clock = ManualClock::<u32>::new();
    let mut interval = Interval::new(clock.now());
    let period = ms(100);

    let mut fired = heapless::Vec::<u32, 32>::new();
    for _ in 0..1_000 {
        clock.advance(3);
        if interval.poll(clock.now(), period) {
            let _ = fired.push(clock.ticks());
        }
    }

    assert!(fired.len() >= 2);
    let mut previous = 0;
    for &at in fired.iter() {
        let gap = at - previous;
        assert!(gap >= 100 && gap < 200, "gap {gap}");
        previous = at;
    }
}

#[test]
fn interval_never_fires_twice_per_instant() {
    let mut interval = Interval::new(Timestamp(0u32));

    assert!(interval.poll(Timestamp(500), ms(500)));
    assert!(!interval.poll(Timestamp(500), ms(500)));
}

#[test]
fn stalled_loop_fires_once_on_resume() {
    let clock = ManualClock::<u32>::new();
    let mut interval = Interval::new(clock.now());

    clock.advance(500);
    let fires = (0..10)
        .filter(|_| interval.poll(clock.now(), ms(100)))
        .count();
    assert_eq!(fires, 1);

    // Re-armed at the resume instant, not at a multiple of the period
    assert_eq!(interval.last_fired(), Timestamp(500));
    clock.advance(99);
    assert!(!interval.poll(clock.now(), ms(100)));
    clock.advance(1);
    assert!(interval.poll(clock.now(), ms(100)));
}

#[test]
fn interval_keeps_firing_through_narrow_counter_wrap() {
    let clock = ManualClock::<u8>::starting_at(0);
    let mut interval = Interval::new(clock.now());
    let mut fires = 0;

    // Four full wraps of an 8-bit counter
    for _ in 0..1_024 {
        clock.advance(1);
        if interval.poll(clock.now(), Millis(100u8)) {
            fires += 1;
        }
    }

    assert_eq!(fires, 10);
}

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

mod ports;

use avr_device::atmega328p::{Peripherals, TC1};
use panic_halt as _;

use port_exercises::board;
use port_exercises::{Dispatcher, Ports, Prescaler, Showcase, TickCounter, TimerConfig};

use crate::ports::{ButtonPins, Port};

/// Exercise started at power-up.
const EXERCISE: u8 = 10;

/// Tour the LED exercises instead of running [`EXERCISE`].
const SHOWCASE: bool = false;

/// Maximum number of routines running side by side.
const MAX_ACTIVE: usize = 2;

/// Millisecond counter advanced by the Timer1 compare interrupt.
static MILLIS: TickCounter<u32> = TickCounter::new();

#[avr_device::interrupt(atmega328p)]
fn TIMER1_COMPA() {
    MILLIS.tick();
}

/// Puts Timer1 in CTC mode with a compare interrupt at the configured tick rate.
fn configure_timer(tc1: &TC1, config: &TimerConfig) {
    // A board without a valid 1 kHz divider cannot run; halt in the panic handler.
    let Ok(compare) = config.compare_value() else {
        panic!()
    };

    // SAFETY: WGM1 = 0b0100 selects CTC with TOP in OCR1A; any compare value is valid.
    tc1.tccr1a.write(|w| unsafe { w.wgm1().bits(0b00) });
    tc1.tccr1b.write(|w| {
        let w = unsafe { w.wgm1().bits(0b01) };
        match config.prescaler {
            Prescaler::Div1 => w.cs1().direct(),
            Prescaler::Div8 => w.cs1().prescale_8(),
            Prescaler::Div64 => w.cs1().prescale_64(),
            Prescaler::Div256 => w.cs1().prescale_256(),
            Prescaler::Div1024 => w.cs1().prescale_1024(),
        }
    });
    tc1.ocr1a.write(|w| unsafe { w.bits(compare) });
    tc1.timsk1.write(|w| w.ocie1a().set_bit());
}

#[avr_device::entry]
fn main() -> ! {
    let Some(dp) = Peripherals::take() else {
        panic!()
    };

    configure_timer(&dp.TC1, &TimerConfig::ATMEGA328P_1KHZ);

    let button_mask = board::BUTTONS.pin_mask();
    let mut bar = Port::D(dp.PORTD);
    let mut segments = Port::B(dp.PORTB);
    let mut control = Port::C(dp.PORTC);
    bar.configure(0x00);
    segments.configure(0x00);
    control.configure(button_mask);

    let ports = Ports::new(bar, segments, control);

    // SAFETY: all shared state is behind critical sections.
    unsafe { avr_device::interrupt::enable() };

    let Ok(mut dispatcher) =
        Dispatcher::<_, _, _, _, MAX_ACTIVE>::new(ports, ButtonPins, board::BUTTONS, &MILLIS)
    else {
        panic!()
    };

    if SHOWCASE {
        Showcase::start(&mut dispatcher).run(&mut dispatcher)
    }

    dispatcher.select(EXERCISE);
    dispatcher.run()
}

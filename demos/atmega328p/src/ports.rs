use avr_device::atmega328p::{PORTB, PORTC, PORTD};
use port_exercises::{InputPort, OutputPort};

/// One of the three output banks, owning its peripheral.
pub enum Port {
    B(PORTB),
    C(PORTC),
    D(PORTD),
}

impl Port {
    /// Switches every pin of the bank to output, except `inputs`.
    pub fn configure(&mut self, inputs: u8) {
        let outputs = !inputs;
        // SAFETY: every bit pattern is a valid data direction.
        match self {
            Port::B(port) => port.ddrb.write(|w| unsafe { w.bits(outputs) }),
            Port::C(port) => port.ddrc.write(|w| unsafe { w.bits(outputs & 0x7F) }),
            Port::D(port) => port.ddrd.write(|w| unsafe { w.bits(outputs) }),
        }
    }
}

impl OutputPort for Port {
    fn write(&mut self, value: u8) {
        // SAFETY: every bit pattern is a valid output latch value.
        match self {
            Port::B(port) => port.portb.write(|w| unsafe { w.bits(value) }),
            Port::C(port) => port.portc.write(|w| unsafe { w.bits(value & 0x7F) }),
            Port::D(port) => port.portd.write(|w| unsafe { w.bits(value) }),
        }
    }

    fn latch(&self) -> u8 {
        match self {
            Port::B(port) => port.portb.read().bits(),
            Port::C(port) => port.portc.read().bits(),
            Port::D(port) => port.portd.read().bits(),
        }
    }
}

/// Pin levels of port C, where the buttons are wired.
///
/// `PORTC` itself is owned by the control [`Port`]; this only reads `PINC`.
pub struct ButtonPins;

impl InputPort for ButtonPins {
    fn read(&mut self) -> u8 {
        // SAFETY: reading PINC has no side effects.
        unsafe { (*PORTC::ptr()).pinc.read().bits() }
    }
}

use avr_device::atmega128rfa1::TC0;

use crate::config::CPU_FREQ_HZ;

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

const PRESCALER_MASK: u8 = 0x07;

/// 16MHz/64 = 250kHz, 250 ticks = 1ms
const TICKS_PER_MS: u8 = (CPU_FREQ_HZ / 64 / 1000) as u8;

/// Timer0 in normal mode, used for busy-wait delays
pub struct Timer0 {
    _private: (),
}

impl Timer0 {
    pub fn new() -> Self {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0a.write(|w| w.bits(0));
            (*p).tccr0b.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
        }
        Self { _private: () }
    }

    pub fn start(&mut self, prescaler: Prescaler) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0b.modify(|r, w| {
                w.bits((r.bits() & !PRESCALER_MASK) | (prescaler as u8 & PRESCALER_MASK))
            });
        }
    }

    pub fn stop(&mut self) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0b.modify(|r, w| w.bits(r.bits() & !PRESCALER_MASK));
        }
    }

    pub fn set_counter(&mut self, value: u8) {
        unsafe {
            (*TC0::ptr()).tcnt0.write(|w| w.bits(value));
        }
    }

    pub fn counter(&self) -> u8 {
        unsafe { (*TC0::ptr()).tcnt0.read().bits() }
    }
}

impl Default for Timer0 {
    fn default() -> Self {
        Self::new()
    }
}

// Millisecond delay using Timer0
pub fn delay_ms(ms: u16) {
    let mut timer = Timer0::new();

    timer.set_counter(0);
    timer.start(Prescaler::Div64);

    for _ in 0..ms {
        while timer.counter() < TICKS_PER_MS {}
        timer.set_counter(0);
    }

    timer.stop();
}

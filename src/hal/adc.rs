use avr_device::atmega128rfa1::ADC;

use super::settings::{AdcChannel, AdcPrescaler, AdcReference};

// ADCSRA
const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
const ADATE: u8 = 1 << 5;
const ADIE: u8 = 1 << 3;
// ADCSRB
const AVDDOK: u8 = 1 << 7;
const MUX5: u8 = 1 << 3;
const ADTS_MASK: u8 = 0x07;

pub struct Adc {
    _private: (),
}

impl Adc {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Enabling the ADC also starts the AVDD analog regulator
    pub fn power_up(&mut self, prescaler: AdcPrescaler, interrupt: bool) {
        let mut bits = ADEN | prescaler as u8;
        if interrupt {
            bits |= ADIE;
        }
        unsafe {
            (*ADC::ptr()).adcsra.write(|w| w.bits(bits));
        }
    }

    /// Analog regulator settled
    pub fn avdd_ok(&self) -> bool {
        unsafe { (*ADC::ptr()).adcsrb.read().bits() & AVDDOK != 0 }
    }

    /// Sample and hold tracking time, in ADTHT steps
    pub fn set_tracking_time(&mut self, steps: u8) {
        unsafe {
            (*ADC::ptr())
                .adcsrc
                .modify(|r, w| w.bits((r.bits() & 0x3F) | ((steps & 0x03) << 6)));
        }
    }

    pub fn select(&mut self, channel: AdcChannel, reference: AdcReference) {
        let mux = channel as u8;
        unsafe {
            let p = ADC::ptr();
            // MUX5 must be written before ADMUX
            (*p).adcsrb.modify(|r, w| {
                let cleared = r.bits() & !MUX5;
                w.bits(if mux & 0x20 != 0 { cleared | MUX5 } else { cleared })
            });
            (*p).admux
                .write(|w| w.bits(((reference as u8) << 6) | (mux & 0x1F)));
        }
    }

    /// Free running conversions until powered down
    pub fn start_free_running(&mut self) {
        unsafe {
            let p = ADC::ptr();
            (*p).adcsrb.modify(|r, w| w.bits(r.bits() & !ADTS_MASK));
            (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADATE | ADSC));
        }
    }

    pub fn start_single(&mut self) {
        unsafe {
            let p = ADC::ptr();
            (*p).adcsra
                .modify(|r, w| w.bits((r.bits() & !ADATE) | ADSC));
        }
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}

#[avr_device::interrupt(atmega128rfa1)]
fn ADC() {
    // Results are not read
}

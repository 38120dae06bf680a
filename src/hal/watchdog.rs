use avr_device::atmega128rfa1::{CPU, WDT};
use avr_device::interrupt::{self, Mutex};
use core::cell::Cell;

/// WDP3..0 encodings; WDP3 sits apart from the others at bit 5
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0x00,
    Ms32 = 0x01,
    Ms64 = 0x02,
    Ms125 = 0x03,
    Ms250 = 0x04,
    Ms500 = 0x05,
    Ms1000 = 0x06,
    Ms2000 = 0x07,
    Ms4000 = 0x20,
    Ms8000 = 0x21,
}

impl WatchdogTimeout {
    pub const fn millis(self) -> u32 {
        match self {
            WatchdogTimeout::Ms16 => 16,
            WatchdogTimeout::Ms32 => 32,
            WatchdogTimeout::Ms64 => 64,
            WatchdogTimeout::Ms125 => 125,
            WatchdogTimeout::Ms250 => 250,
            WatchdogTimeout::Ms500 => 500,
            WatchdogTimeout::Ms1000 => 1000,
            WatchdogTimeout::Ms2000 => 2000,
            WatchdogTimeout::Ms4000 => 4000,
            WatchdogTimeout::Ms8000 => 8000,
        }
    }
}

const WDRF: u8 = 1 << 3;
const WDIE: u8 = 1 << 6;
const WDCE: u8 = 1 << 4;
const WDE: u8 = 1 << 3;

static WAKE: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Interrupt mode only: the timeout wakes the core instead of resetting it
    pub fn start_wake_timer(&mut self, timeout: WatchdogTimeout) {
        interrupt::free(|_| unsafe {
            let p = WDT::ptr();
            // Timed sequence: change enable, then the new setting within 4 cycles
            (*p).wdtcsr.write(|w| w.bits(WDCE | WDE));
            (*p).wdtcsr.write(|w| w.bits(WDIE | timeout as u8));
        });
    }

    /// Also clears a pending watchdog reset flag, which would otherwise keep
    /// the watchdog enabled
    pub fn disable(&mut self) {
        interrupt::free(|_| unsafe {
            avr_device::asm::wdr();
            (*CPU::ptr()).mcusr.modify(|r, w| w.bits(r.bits() & !WDRF));
            let p = WDT::ptr();
            (*p).wdtcsr.write(|w| w.bits(WDCE | WDE));
            (*p).wdtcsr.write(|w| w.bits(0x00));
        });
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

/// True once per watchdog wake-up
pub fn take_wake() -> bool {
    interrupt::free(|cs| WAKE.borrow(cs).replace(false))
}

#[avr_device::interrupt(atmega128rfa1)]
fn WDT() {
    interrupt::free(|cs| WAKE.borrow(cs).set(true));
}

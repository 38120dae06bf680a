use avr_device::atmega128rfa1::CPU;

/// SMCR sleep mode select values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SleepMode {
    Idle = 0,
    AdcNoiseReduction = 1,
    PowerDown = 2,
    PowerSave = 3,
    Standby = 6,
    ExtendedStandby = 7,
}

const SM_MASK: u8 = 0x0E;
const SE: u8 = 0x01;

pub struct Power {
    _private: (),
}

impl Power {
    pub fn new() -> Self {
        Self { _private: () }
    }

    #[inline]
    pub fn set_sleep_mode(&mut self, mode: SleepMode) {
        unsafe {
            let p = CPU::ptr();
            (*p).smcr
                .modify(|r, w| w.bits((r.bits() & !SM_MASK) | ((mode as u8) << 1)));
        }
    }

    #[inline]
    pub fn enable_sleep(&mut self) {
        unsafe {
            let p = CPU::ptr();
            (*p).smcr.modify(|r, w| w.bits(r.bits() | SE));
        }
    }

    #[inline]
    pub fn disable_sleep(&mut self) {
        unsafe {
            let p = CPU::ptr();
            (*p).smcr.modify(|r, w| w.bits(r.bits() & !SE));
        }
    }

    #[inline]
    pub fn sleep(&mut self) {
        avr_device::asm::sleep()
    }

    /// Sleeps until the next enabled interrupt
    pub fn enter(&mut self, mode: SleepMode) {
        self.set_sleep_mode(mode);
        self.enable_sleep();
        self.sleep();
        self.disable_sleep();
    }

    /// Like `enter`, but interrupts are enabled right before `sleep` so a
    /// wake-up source that fired after the caller's last check is not missed.
    /// Call with interrupts disabled.
    pub fn enter_atomic(&mut self, mode: SleepMode) {
        self.set_sleep_mode(mode);
        self.enable_sleep();
        unsafe { avr_device::interrupt::enable() };
        self.sleep();
        self.disable_sleep();
    }
}

impl Default for Power {
    fn default() -> Self {
        Self::new()
    }
}

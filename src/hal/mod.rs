#[cfg(target_arch = "avr")]
pub mod adc;
#[cfg(target_arch = "avr")]
pub mod eeprom;
#[cfg(target_arch = "avr")]
pub mod power;
#[cfg(target_arch = "avr")]
pub mod radio;
pub mod settings;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;
#[cfg(target_arch = "avr")]
pub mod watchdog;

// Re-export commonly used types
#[cfg(target_arch = "avr")]
pub use adc::Adc;
#[cfg(target_arch = "avr")]
pub use eeprom::Eeprom;
#[cfg(target_arch = "avr")]
pub use power::{Power, SleepMode};
#[cfg(target_arch = "avr")]
pub use radio::Radio;
pub use settings::{AdcChannel, AdcPrescaler, AdcReference};
#[cfg(target_arch = "avr")]
pub use timer::delay_ms;
#[cfg(target_arch = "avr")]
pub use uart::Uart;
#[cfg(target_arch = "avr")]
pub use watchdog::{Watchdog, WatchdogTimeout};

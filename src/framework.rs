//! Interface to the radio runtime the application runs on
//!
//! The runtime owns the MAC, the transmit queue, the sleep controller and the
//! analog block. It calls into the application through [`Event`]s and offers
//! its services through [`Framework`]. Callbacks run to completion and are
//! never re-entered.

use embedded_hal::serial;

use crate::protocol::TxRequest;

/// Callbacks delivered by the runtime's event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Delivered once, right after cold start
    StartUp,
    /// Delivered right after the state machine changed state
    NewState,
    /// A queued transmission finished, successfully or not
    TxComplete { cb_id: u8, success: bool },
    /// A frame arrived while the receiver was open
    Received { src_addr: u32, length: u8, lqi: u8 },
    /// Network layer notification
    Network { event: u8, arg: u32 },
    /// Deferred half of a hardware interrupt
    Hardware { device_id: u32, item_bitmap: u32 },
    /// Periodic runtime tick
    Tick,
}

/// What the driver loop does after an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop for good; nothing is dispatched afterwards
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartPort {
    Uart0,
    Uart1,
}

/// Serial port setup for the debug console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: UartPort,
    pub baud_rate: u32,
    pub tx_queue: usize,
    pub rx_queue: usize,
    /// `None` leaves RTS/CTS flow control off
    pub rts_thresholds: Option<(u16, u16)>,
    /// Received bytes that raise the RX interrupt
    pub rx_fifo_level: u8,
}

/// Radio parameters the MAC starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioContext {
    pub app_id: u32,
    pub channel: u8,
    /// Keep the receiver on between transmissions
    pub rx_on_idle: bool,
    /// 0 (weakest) to 3 (strongest)
    pub tx_power: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrownOutConfig {
    /// Supply voltage the device keeps running down to
    pub threshold_mv: u16,
    pub reset_enabled: bool,
    pub rising_interrupt: bool,
    pub falling_interrupt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeTimer {
    Timer0,
    Timer1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    pub timer: WakeTimer,
    pub duration_ms: u32,
    /// Re-arm the wake timer on every wake-up
    pub periodic: bool,
    /// Drop RAM retention while asleep
    pub ram_off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    Two,
    Four,
    Six,
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcClock {
    Khz250,
    Khz500,
    Mhz1,
    Mhz2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcReference {
    Internal,
    External,
}

/// Analog block power-up parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogConfig {
    pub regulator: bool,
    /// Disabling this also cuts power to the analog block
    pub interrupt: bool,
    pub samples: SampleCount,
    pub clock: AdcClock,
    pub reference: AdcReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcMode {
    SingleShot,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRange {
    /// 0 to 1.2 V
    Range1,
    /// 0 to 2.4 V
    Range2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcSource {
    Adc1,
    Adc2,
    Adc3,
    Adc4,
    Temperature,
    SupplyVoltage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcConfig {
    pub mode: AdcMode,
    pub range: InputRange,
    pub source: AdcSource,
}

/// Services the runtime offers to the application
pub trait Framework {
    /// Byte sink the debug console writes through
    type Serial: serial::Write<u8>;

    /// Brings up a UART; cannot fail on supported hardware
    fn open_serial(&mut self, config: &SerialConfig) -> Self::Serial;

    /// Verbosity of the runtime's own trace output
    fn set_debug_level(&mut self, level: u8);

    /// Factory-unique serial number of this module
    fn serial_number(&self) -> u32;

    fn configure_brown_out(&mut self, config: &BrownOutConfig);

    /// Starts the MAC with the given radio parameters
    fn start_mac(&mut self, context: &RadioContext);

    /// Queues a frame; `true` when the MAC accepted it
    fn transmit(&mut self, request: &TxRequest) -> bool;

    /// Arms the wake timer and selects the sleep state
    fn sleep(&mut self, request: &SleepRequest);

    fn analog_regulator_enabled(&self) -> bool;

    fn configure_analog(&mut self, config: &AnalogConfig);

    /// Enables the ADC and starts sampling
    fn start_adc(&mut self, config: &AdcConfig);
}

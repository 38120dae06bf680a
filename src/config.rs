//! Configuration constants for the current bench firmware
//!
//! Every scenario flag is fixed at build time through a Cargo feature, so one
//! image measures exactly one power state. Rebuild and reflash to change it.

use crate::error::ConfigError;
use crate::framework::{
    AdcClock, AdcConfig, AdcMode, AdcReference, AdcSource, AnalogConfig, BrownOutConfig,
    InputRange, SampleCount, SerialConfig, UartPort,
};

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 115_200;

/// Debug UART transmit queue size in bytes
pub const UART_TX_QUEUE: usize = 96;

/// Debug UART receive queue size in bytes
pub const UART_RX_QUEUE: usize = 32;

/// Application id shared by every node of this bench
pub const APP_ID: u32 = 0x6772_1122;

/// 2.4 GHz channel
pub const CHANNEL: u8 = 15;

/// Verbosity of the radio runtime's own trace output
pub const FRAMEWORK_DEBUG_LEVEL: u8 = 0;

/// Sleep duration requested in the sleep scenarios (one hour)
pub const SLEEP_DURATION_MS: u32 = 3_600_000;

/// Brown-out threshold; the device keeps running down to this supply voltage
pub const BROWN_OUT_MV: u16 = 2_000;

/// Debug console port: no flow control, interrupt on every received byte
pub const DEBUG_SERIAL: SerialConfig = SerialConfig {
    port: UartPort::Uart0,
    baud_rate: UART_BAUD,
    tx_queue: UART_TX_QUEUE,
    rx_queue: UART_RX_QUEUE,
    rts_thresholds: None,
    rx_fifo_level: 1,
};

pub const BROWN_OUT: BrownOutConfig = BrownOutConfig {
    threshold_mv: BROWN_OUT_MV,
    reset_enabled: false,
    rising_interrupt: false,
    falling_interrupt: false,
};

pub const ANALOG_SETUP: AnalogConfig = AnalogConfig {
    regulator: true,
    interrupt: true,
    samples: SampleCount::Four,
    clock: AdcClock::Khz500,
    reference: AdcReference::Internal,
};

/// Continuous conversion of the supply voltage, 0 to 2.4 V range
pub const ADC_SETUP: AdcConfig = AdcConfig {
    mode: AdcMode::Continuous,
    range: InputRange::Range2,
    source: AdcSource::SupplyVoltage,
};

pub const SLEEP: bool = cfg!(feature = "sleep");
pub const RAM_OFF: bool = cfg!(feature = "ram-off");
pub const RX_ENABLE: bool = cfg!(feature = "rx");
pub const TX_ENABLE: bool = cfg!(feature = "tx");
pub const ADC_POWER: bool = cfg!(feature = "adc-power");
pub const ADC_MEASURING: bool = cfg!(feature = "adc-measuring");

/// 3 is the strongest output, 0 the weakest
pub const TX_POWER: u8 = if cfg!(feature = "tx-power-3") {
    3
} else if cfg!(feature = "tx-power-2") {
    2
} else if cfg!(feature = "tx-power-1") {
    1
} else {
    0
};

/// Highest accepted transmit power level
pub const TX_POWER_MAX: u8 = 3;

/// Immutable scenario record, built once at cold start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Go to sleep right after startup and never wake up the application
    pub sleep: bool,
    /// Drop RAM retention while sleeping
    pub ram_off: bool,
    /// Keep the receiver open while idle
    pub rx_enable: bool,
    /// Transmit broadcasts back to back
    pub tx_enable: bool,
    pub tx_power: u8,
    /// Power the analog block
    pub adc_power: bool,
    /// Run the ADC continuously (only with `adc_power`)
    pub adc_measuring: bool,
    pub app_id: u32,
    pub channel: u8,
}

impl Config {
    /// The scenario selected by the enabled Cargo features
    pub const ACTIVE: Config = Config {
        sleep: SLEEP,
        ram_off: RAM_OFF,
        rx_enable: RX_ENABLE,
        tx_enable: TX_ENABLE,
        tx_power: TX_POWER,
        adc_power: ADC_POWER,
        adc_measuring: ADC_MEASURING,
        app_id: APP_ID,
        channel: CHANNEL,
    };

    /// A wake-only record: radio closed, analog off
    pub const fn idle() -> Self {
        Self {
            sleep: false,
            ram_off: false,
            rx_enable: false,
            tx_enable: false,
            tx_power: 0,
            adc_power: false,
            adc_measuring: false,
            app_id: APP_ID,
            channel: CHANNEL,
        }
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_power > TX_POWER_MAX {
            return Err(ConfigError::TxPowerOutOfRange(self.tx_power));
        }
        if self.channel < 11 || self.channel > 26 {
            return Err(ConfigError::ChannelOutOfRange(self.channel));
        }
        Ok(())
    }

    /// The MAC only needs to run when the radio is used at all
    pub const fn radio_used(&self) -> bool {
        self.rx_enable || self.tx_enable
    }
}

const _: () = assert!(Config::ACTIVE.validate().is_ok());

/// The measurement matrix this firmware was built for.
///
/// Continuous transmit could not be read reliably on a handheld meter; the
/// readings swing and come out low. Those rows are kept for scope captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Sleep with RAM retention dropped
    Sleep,
    /// Sleep with RAM retained
    SleepRamRetained,
    /// Awake, radio closed
    Wake,
    /// Awake, receiver open
    WakeRxIdle,
    /// Awake, analog block powered
    WakeAdcStandby,
    /// Awake, ADC converting continuously
    WakeAdcMeasuring,
    /// Awake, continuous transmit at the given power
    WakeTx(u8),
    /// Awake, receiver open and continuous transmit at the given power
    WakeRxTx(u8),
}

impl Scenario {
    pub const fn config(self) -> Config {
        let base = Config::idle();
        match self {
            Scenario::Sleep => Config { sleep: true, ram_off: true, ..base },
            Scenario::SleepRamRetained => Config { sleep: true, ..base },
            Scenario::Wake => base,
            Scenario::WakeRxIdle => Config { rx_enable: true, ..base },
            Scenario::WakeAdcStandby => Config { adc_power: true, ..base },
            Scenario::WakeAdcMeasuring => Config {
                adc_power: true,
                adc_measuring: true,
                ..base
            },
            Scenario::WakeTx(power) => Config {
                tx_enable: true,
                tx_power: power,
                ..base
            },
            Scenario::WakeRxTx(power) => Config {
                rx_enable: true,
                tx_enable: true,
                tx_power: power,
                ..base
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_config_is_valid() {
        assert_eq!(Config::ACTIVE.validate(), Ok(()));
    }

    #[test]
    fn rejects_power_above_three() {
        let config = Scenario::WakeTx(4).config();
        assert_eq!(config.validate(), Err(ConfigError::TxPowerOutOfRange(4)));
    }

    #[test]
    fn rejects_channel_outside_band() {
        let config = Config {
            channel: 27,
            ..Config::idle()
        };
        assert_eq!(config.validate(), Err(ConfigError::ChannelOutOfRange(27)));
    }

    #[test]
    fn sleep_scenarios_differ_only_in_ram_retention() {
        let off = Scenario::Sleep.config();
        let on = Scenario::SleepRamRetained.config();
        assert!(off.sleep && on.sleep);
        assert!(off.ram_off);
        assert!(!on.ram_off);
        assert_eq!(Config { ram_off: false, ..off }, on);
    }

    #[test]
    fn radio_used_only_with_rx_or_tx() {
        assert!(!Scenario::Wake.config().radio_used());
        assert!(!Scenario::WakeAdcMeasuring.config().radio_used());
        assert!(Scenario::WakeRxIdle.config().radio_used());
        assert!(Scenario::WakeTx(3).config().radio_used());
    }
}

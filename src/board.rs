//! ATmega128RFA1 implementation of the radio runtime
//!
//! The MAC here is deliberately thin: frames are broadcast unacknowledged,
//! repeats are spaced with a busy-wait and only one request is in flight at
//! a time. Sleep is entered from the driver loop once the application has
//! halted, with the watchdog interrupt as the wake timer.

use avr_device::atmega128rfa1::Peripherals;
use avr_device::interrupt;

use crate::framework::{
    AdcConfig, AdcMode, AdcReference, AnalogConfig, BrownOutConfig, Event, Framework,
    RadioContext, SerialConfig, SleepRequest,
};
use crate::hal::settings::{adc_input, prescaler_for, tracking_steps};
use crate::hal::{
    self, radio, watchdog, Adc, Eeprom, Power, Radio, SleepMode, Uart, Watchdog, WatchdogTimeout,
};
use crate::protocol::frame::{self, PHY_MAX_FRAME};
use crate::protocol::TxRequest;

/// Where production programming stores the module's serial number
const SERIAL_NUMBER_ADDR: u16 = 0x0000;

/// Longest watchdog period; sleep durations are counted in these steps
const WAKE_STEP: WatchdogTimeout = WatchdogTimeout::Ms8000;

/// A request that is still on air
struct Transmission {
    repeats_left: u16,
    interval_ms: u16,
    cb_id: u8,
}

pub struct Board {
    _peripherals: Peripherals,
    power: Power,
    watchdog: Watchdog,
    radio: Radio,
    adc: Adc,
    serial_number: u32,
    app_id: u32,
    mac_started: bool,
    seq: u8,
    frame: [u8; PHY_MAX_FRAME + 1],
    frame_len: usize,
    in_flight: Option<Transmission>,
    reference: AdcReference,
    sleep: Option<SleepRequest>,
}

impl Board {
    /// Claims the peripherals; `None` if they were taken before
    pub fn take() -> Option<Self> {
        let peripherals = Peripherals::take()?;

        // A watchdog reset leaves the watchdog running
        let mut watchdog = Watchdog::new();
        watchdog.disable();

        let serial_number = Eeprom::new().read_u32(SERIAL_NUMBER_ADDR);

        Some(Self {
            _peripherals: peripherals,
            power: Power::new(),
            watchdog,
            radio: Radio::new(),
            adc: Adc::new(),
            serial_number,
            app_id: 0,
            mac_started: false,
            seq: 0,
            frame: [0; PHY_MAX_FRAME + 1],
            frame_len: 0,
            in_flight: None,
            reference: AdcReference::Internal,
            sleep: None,
        })
    }

    /// Next runtime event, if the transceiver produced one
    pub fn poll_event(&mut self) -> Option<Event> {
        if radio::take_tx_end() {
            return self.on_tx_end();
        }
        if radio::take_rx_end() {
            return self.on_rx_end();
        }
        None
    }

    fn on_tx_end(&mut self) -> Option<Event> {
        let transmission = self.in_flight.as_mut()?;
        if transmission.repeats_left > 0 {
            transmission.repeats_left -= 1;
            hal::delay_ms(transmission.interval_ms);
            self.radio.transmit(&self.frame[..self.frame_len]);
            return None;
        }

        let cb_id = transmission.cb_id;
        self.in_flight = None;
        self.radio.idle();
        Some(Event::TxComplete {
            cb_id,
            success: true,
        })
    }

    fn on_rx_end(&mut self) -> Option<Event> {
        let mut psdu = [0u8; PHY_MAX_FRAME];
        let (length, lqi) = self.radio.read_frame(&mut psdu);
        let (header, payload) = frame::decode(&psdu[..length]).ok()?;
        if header.pan_id != frame::pan_id(self.app_id) {
            return None;
        }
        Some(Event::Received {
            src_addr: header.src_addr,
            length: payload.len() as u8,
            lqi,
        })
    }

    /// Idles the core until the next interrupt unless an event is waiting
    pub fn idle(&mut self) {
        interrupt::disable();
        if radio::event_pending() {
            unsafe { interrupt::enable() };
            return;
        }
        self.power.enter_atomic(SleepMode::Idle);
    }

    /// Sleeps out one period of the requested sleep; `true` when it elapsed.
    /// Without a periodic request the device never wakes again.
    pub fn sleep_period(&mut self) -> bool {
        let request = match self.sleep {
            Some(request) => request,
            None => self.power_off(),
        };

        let mode = if request.ram_off {
            SleepMode::PowerDown
        } else {
            SleepMode::PowerSave
        };

        self.radio.sleep();
        self.watchdog.start_wake_timer(WAKE_STEP);
        let mut remaining = request.duration_ms;
        while remaining > 0 {
            self.power.enter(mode);
            if watchdog::take_wake() {
                remaining = remaining.saturating_sub(WAKE_STEP.millis());
            }
        }
        self.watchdog.disable();

        if !request.periodic {
            self.sleep = None;
        }
        true
    }

    fn power_off(&mut self) -> ! {
        self.radio.sleep();
        interrupt::disable();
        loop {
            self.power.enter(SleepMode::PowerDown);
        }
    }
}

impl Framework for Board {
    type Serial = Uart;

    fn open_serial(&mut self, config: &SerialConfig) -> Uart {
        // Only USART0 reaches the debug header; flow control is not wired
        Uart::new(config.baud_rate)
    }

    fn set_debug_level(&mut self, _level: u8) {
        // No runtime trace output on this board
    }

    fn serial_number(&self) -> u32 {
        self.serial_number
    }

    fn configure_brown_out(&mut self, config: &BrownOutConfig) {
        // BOD reset is fuse controlled, only the supply monitor threshold is set
        radio::set_battery_monitor(config.threshold_mv);
    }

    fn start_mac(&mut self, context: &RadioContext) {
        self.app_id = context.app_id;
        self.radio.wake();
        self.radio.set_channel(context.channel);
        self.radio.set_tx_power(context.tx_power);
        self.radio
            .set_addresses(frame::pan_id(context.app_id), self.serial_number as u16);
        self.radio.start(context.rx_on_idle);
        self.mac_started = true;
    }

    fn transmit(&mut self, request: &TxRequest) -> bool {
        if !self.mac_started || self.in_flight.is_some() {
            return false;
        }

        let length = match frame::encode(request, self.app_id, self.seq, &mut self.frame) {
            Ok(length) => length,
            Err(_) => return false,
        };
        self.frame_len = length;
        self.seq = self.seq.wrapping_add(1);

        // Random start delay is not supported; the first attempt goes out now
        self.radio.transmit(&self.frame[..length]);
        self.in_flight = Some(Transmission {
            repeats_left: u16::from(request.retries),
            interval_ms: request.retry_interval_ms,
            cb_id: request.cb_id,
        });
        true
    }

    fn sleep(&mut self, request: &SleepRequest) {
        // Entered by the driver loop once the application halted
        self.sleep = Some(*request);
    }

    fn analog_regulator_enabled(&self) -> bool {
        self.adc.avdd_ok()
    }

    fn configure_analog(&mut self, config: &AnalogConfig) {
        self.reference = config.reference;
        if config.regulator {
            self.adc
                .power_up(prescaler_for(config.clock), config.interrupt);
        }
        self.adc.set_tracking_time(tracking_steps(config.samples));
    }

    fn start_adc(&mut self, config: &AdcConfig) {
        let (channel, reference) = adc_input(config.source, self.reference, config.range);
        self.adc.select(channel, reference);
        match config.mode {
            AdcMode::Continuous => self.adc.start_free_running(),
            AdcMode::SingleShot => self.adc.start_single(),
        }
    }
}

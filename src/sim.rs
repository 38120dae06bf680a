//! Simulated radio runtime for running the bench on the host.
//!
//! Every service call is recorded so a run can be inspected afterwards.
//! Accepted transmissions queue a `TxComplete` event, the way the MAC reports
//! the end of a transmission on hardware.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::serial;

use crate::framework::{
    AdcConfig, AnalogConfig, BrownOutConfig, Event, Framework, RadioContext, SerialConfig,
    SleepRequest,
};
use crate::protocol::TxRequest;

/// In-memory UART. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SimSerial {
    tx: Rc<RefCell<Vec<u8>>>,
    flushes: Rc<Cell<usize>>,
}

impl SimSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn output(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.tx.borrow()).into_owned()
    }

    /// Output split on line breaks, empty pieces dropped
    pub fn lines(&self) -> Vec<String> {
        self.text()
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.get()
    }
}

impl serial::Write<u8> for SimSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.tx.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.flushes.set(self.flushes.get() + 1);
        Ok(())
    }
}

/// Polls the regulator answers "off" before it reports ready
const REGULATOR_SETTLE_POLLS: u32 = 3;

/// Host implementation of [`Framework`]
#[derive(Debug)]
pub struct SimFramework<S = SimSerial> {
    serial: S,
    serial_number: u32,
    accept: bool,
    serial_config: Option<SerialConfig>,
    debug_level: Option<u8>,
    brown_out: Option<BrownOutConfig>,
    mac: Option<RadioContext>,
    regulator_on: bool,
    regulator_polls: Cell<u32>,
    analog: Option<AnalogConfig>,
    adc: Option<AdcConfig>,
    sleep: Option<SleepRequest>,
    transmissions: Vec<TxRequest>,
    events: VecDeque<Event>,
}

impl SimFramework<SimSerial> {
    pub fn new(serial_number: u32) -> Self {
        Self::with_serial(serial_number, SimSerial::new())
    }
}

impl<S> SimFramework<S> {
    /// Uses `serial` (or clones of it) as the debug UART
    pub fn with_serial(serial_number: u32, serial: S) -> Self {
        Self {
            serial,
            serial_number,
            accept: true,
            serial_config: None,
            debug_level: None,
            brown_out: None,
            mac: None,
            regulator_on: false,
            regulator_polls: Cell::new(0),
            analog: None,
            adc: None,
            sleep: None,
            transmissions: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// Analog regulator already powered, as after a warm start
    pub fn with_regulator_on(mut self) -> Self {
        self.regulator_on = true;
        self.regulator_polls.set(REGULATOR_SETTLE_POLLS);
        self
    }

    /// Whether the MAC accepts further transmissions
    pub fn set_accept(&mut self, accept: bool) {
        self.accept = accept;
    }

    /// Next queued runtime event
    pub fn next_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_config(&self) -> Option<&SerialConfig> {
        self.serial_config.as_ref()
    }

    pub fn debug_level(&self) -> Option<u8> {
        self.debug_level
    }

    pub fn brown_out(&self) -> Option<&BrownOutConfig> {
        self.brown_out.as_ref()
    }

    pub fn mac(&self) -> Option<&RadioContext> {
        self.mac.as_ref()
    }

    pub fn analog(&self) -> Option<&AnalogConfig> {
        self.analog.as_ref()
    }

    pub fn adc(&self) -> Option<&AdcConfig> {
        self.adc.as_ref()
    }

    pub fn regulator_polls(&self) -> u32 {
        self.regulator_polls.get()
    }

    pub fn sleep_request(&self) -> Option<&SleepRequest> {
        self.sleep.as_ref()
    }

    /// Every submission, accepted or not
    pub fn transmissions(&self) -> &[TxRequest] {
        &self.transmissions
    }
}

impl<S: serial::Write<u8> + Clone> Framework for SimFramework<S> {
    type Serial = S;

    fn open_serial(&mut self, config: &SerialConfig) -> S {
        self.serial_config = Some(*config);
        self.serial.clone()
    }

    fn set_debug_level(&mut self, level: u8) {
        self.debug_level = Some(level);
    }

    fn serial_number(&self) -> u32 {
        self.serial_number
    }

    fn configure_brown_out(&mut self, config: &BrownOutConfig) {
        self.brown_out = Some(*config);
    }

    fn start_mac(&mut self, context: &RadioContext) {
        self.mac = Some(*context);
    }

    fn transmit(&mut self, request: &TxRequest) -> bool {
        self.transmissions.push(request.clone());
        if self.accept {
            self.events.push_back(Event::TxComplete {
                cb_id: request.cb_id,
                success: true,
            });
        }
        self.accept
    }

    fn sleep(&mut self, request: &SleepRequest) {
        self.sleep = Some(*request);
    }

    fn analog_regulator_enabled(&self) -> bool {
        if !self.regulator_on {
            return false;
        }
        let polls = self.regulator_polls.get();
        if polls < REGULATOR_SETTLE_POLLS {
            self.regulator_polls.set(polls + 1);
            return false;
        }
        true
    }

    fn configure_analog(&mut self, config: &AnalogConfig) {
        self.analog = Some(*config);
        self.regulator_on = config.regulator;
    }

    fn start_adc(&mut self, config: &AdcConfig) {
        self.adc = Some(*config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_clones_share_output() {
        let serial = SimSerial::new();
        let mut writer = serial.clone();
        nb::block!(serial::Write::write(&mut writer, b'A')).unwrap();
        nb::block!(serial::Write::flush(&mut writer)).unwrap();

        assert_eq!(serial.output(), b"A");
        assert_eq!(serial.flush_count(), 1);
    }

    #[test]
    fn lines_split_on_line_breaks() {
        let serial = SimSerial::new();
        let mut writer = serial.clone();
        for &byte in b"\r\nfirst\r\nsecond" {
            nb::block!(serial::Write::write(&mut writer, byte)).unwrap();
        }
        assert_eq!(serial.lines(), vec!["first", "second"]);
    }

    #[test]
    fn rejected_transmit_queues_nothing() {
        let mut framework = SimFramework::new(7);
        framework.set_accept(false);
        assert!(!framework.transmit(&TxRequest::bench_broadcast(7)));
        assert_eq!(framework.transmissions().len(), 1);
        assert_eq!(framework.next_event(), None);
    }

    #[test]
    fn regulator_reports_ready_after_settling() {
        let mut framework = SimFramework::new(7);
        assert!(!framework.analog_regulator_enabled());
        framework.configure_analog(&crate::config::ANALOG_SETUP);
        let mut polls = 0;
        while !framework.analog_regulator_enabled() {
            polls += 1;
        }
        assert_eq!(polls, REGULATOR_SETTLE_POLLS);
    }
}

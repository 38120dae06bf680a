//! Application layer: the bench state machine
//!
//! Two states. `Idle` waits for startup, which either puts the device to
//! sleep for good or arms continuous transmission and moves to `Running`.
//! `Running` sends one broadcast per transmit-complete callback.
//!
//! The runtime may report a transmission complete while the submit call is
//! still running, so state and pending flag live in `Cell`s and every entry
//! point takes `&self`.

use core::cell::Cell;

use crate::config::{self, Config};
use crate::debug;
use crate::drivers::SerialConsole;
use crate::framework::{Event, Flow, Framework, SleepRequest, WakeTimer};
use crate::protocol::TxRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
}

/// Main application state and logic
pub struct Application {
    config: Config,
    state: Cell<State>,
    send_pending: Cell<bool>,
}

impl Application {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Cell::new(State::Idle),
            send_pending: Cell::new(false),
        }
    }

    pub fn state(&self) -> State {
        self.state.get()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A broadcast goes out at the next opportunity
    pub fn send_pending(&self) -> bool {
        self.send_pending.get()
    }

    /// Transmit-complete callback; runs before the state handler sees the event
    pub fn on_tx_complete(&self) {
        self.send_pending.set(true);
    }

    /// State handler for one runtime event
    pub fn handle<F: Framework>(
        &self,
        event: Event,
        framework: &mut F,
        console: &mut SerialConsole<F::Serial>,
    ) -> Flow {
        match self.state.get() {
            State::Idle => {
                if event == Event::StartUp {
                    return self.start_up(framework, console);
                }
            }
            State::Running => match event {
                Event::NewState | Event::TxComplete { .. } => {
                    if self.take_pending() {
                        // Rejected submissions are not retried
                        let _ = send_broadcast(framework);
                    }
                }
                _ => {}
            },
        }
        Flow::Continue
    }

    fn start_up<F: Framework>(
        &self,
        framework: &mut F,
        console: &mut SerialConsole<F::Serial>,
    ) -> Flow {
        if self.config.adc_power {
            power_analog(framework, &self.config);
        }

        if self.config.sleep {
            if self.config.ram_off {
                console.write_line("Sleeping...RAM OFF").ok();
            } else {
                console.write_line("Sleeping...RAM ON").ok();
            }
            framework.sleep(&SleepRequest {
                timer: WakeTimer::Timer0,
                duration_ms: config::SLEEP_DURATION_MS,
                periodic: true,
                ram_off: self.config.ram_off,
            });
            console.flush().ok();
            return Flow::Halt;
        }

        debug!(console, "RX_ENABLE: {}", true_false(self.config.rx_enable));
        debug!(console, "TX_ENABLE: {}", true_false(self.config.tx_enable));

        if self.config.tx_enable {
            debug!(console, "TX_POWER: {}", self.config.tx_power);
            console.write_line("Start sending...").ok();
            self.send_pending.set(true);
            self.state.set(State::Running);
        } else {
            console.write_line("Idling...").ok();
        }
        Flow::Continue
    }

    /// Clears the flag before the caller submits anything
    fn take_pending(&self) -> bool {
        self.send_pending.replace(false)
    }
}

/// Powers the analog block and, when asked for, starts continuous sampling
fn power_analog<F: Framework>(framework: &mut F, config: &Config) {
    if !framework.analog_regulator_enabled() {
        framework.configure_analog(&config::ANALOG_SETUP);
        // Regulator settling
        while !framework.analog_regulator_enabled() {}
    }
    if config.adc_measuring {
        framework.start_adc(&config::ADC_SETUP);
    }
}

/// Queues the bench broadcast; returns whether the MAC accepted it
pub fn send_broadcast<F: Framework>(framework: &mut F) -> bool {
    let request = TxRequest::bench_broadcast(framework.serial_number());
    framework.transmit(&request)
}

fn true_false(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

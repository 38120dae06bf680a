//! Cold start and event dispatch glue between the runtime and the application

use crate::application::{Application, State};
use crate::config::{self, Config};
use crate::drivers::SerialConsole;
use crate::error::Result;
use crate::framework::{Event, Flow, Framework, RadioContext};

/// Opens the debug UART and hands it to the console
pub fn init_hardware<F: Framework>(framework: &mut F) -> SerialConsole<F::Serial> {
    let port = framework.open_serial(&config::DEBUG_SERIAL);
    framework.set_debug_level(config::FRAMEWORK_DEBUG_LEVEL);
    SerialConsole::new(port)
}

/// Everything the runtime calls back into
pub struct Firmware<F: Framework> {
    framework: F,
    console: SerialConsole<F::Serial>,
    app: Application,
    halted: bool,
}

impl<F: Framework> Firmware<F> {
    /// Power-on start. The runtime delivers `Event::StartUp` afterwards.
    pub fn cold_start(mut framework: F, config: Config) -> Result<Self> {
        config.validate()?;

        framework.configure_brown_out(&config::BROWN_OUT);

        let context = RadioContext {
            app_id: config.app_id,
            channel: config.channel,
            rx_on_idle: config.rx_enable,
            tx_power: config.tx_power,
        };

        let console = init_hardware(&mut framework);

        // Without radio use the MAC stays down
        if config.radio_used() {
            framework.start_mac(&context);
        }

        Ok(Self {
            framework,
            console,
            app: Application::new(config),
            halted: false,
        })
    }

    /// Resume from sleep
    pub fn warm_start(&mut self) {}

    /// Opportunistic main loop hook
    pub fn main_tick(&mut self) {}

    /// Immediate half of a hardware interrupt; `true` would claim it
    pub fn hardware_interrupt(&mut self, _device_id: u32, _item_bitmap: u32) -> bool {
        false
    }

    /// Runs one runtime event through the application
    pub fn dispatch(&mut self, event: Event) -> Flow {
        if self.halted {
            return Flow::Halt;
        }

        if let Event::TxComplete { .. } = event {
            self.app.on_tx_complete();
        }

        let before = self.app.state();
        let mut flow = self
            .app
            .handle(event, &mut self.framework, &mut self.console);
        if flow == Flow::Continue && self.app.state() != before {
            flow = self
                .app
                .handle(Event::NewState, &mut self.framework, &mut self.console);
        }

        if flow == Flow::Halt {
            self.halted = true;
        }
        flow
    }

    pub fn state(&self) -> State {
        self.app.state()
    }

    pub fn application(&self) -> &Application {
        &self.app
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn framework(&self) -> &F {
        &self.framework
    }

    pub fn framework_mut(&mut self) -> &mut F {
        &mut self.framework
    }
}

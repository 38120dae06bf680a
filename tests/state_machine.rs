use radio_current_bench::config::{self, Config, Scenario};
use radio_current_bench::framework::{AdcMode, AdcSource, InputRange, WakeTimer};
use radio_current_bench::protocol::{BENCH_PAYLOAD, BROADCAST_ADDR};
use radio_current_bench::sim::SimFramework;
use radio_current_bench::{Event, Firmware, Flow, State};

const SERIAL_NUMBER: u32 = 0x8100_2A2A;

fn boot(config: Config) -> Firmware<SimFramework> {
    Firmware::cold_start(SimFramework::new(SERIAL_NUMBER), config).unwrap()
}

fn lines(firmware: &Firmware<SimFramework>) -> Vec<String> {
    firmware.framework().serial().lines()
}

/// Feeds queued runtime events back in, the way the driver loop does
fn run_events(firmware: &mut Firmware<SimFramework>, limit: usize) -> usize {
    let mut handled = 0;
    while handled < limit {
        match firmware.framework_mut().next_event() {
            Some(event) => {
                firmware.dispatch(event);
                handled += 1;
            }
            None => break,
        }
    }
    handled
}

#[test]
fn sleep_ram_off_logs_once_and_halts() {
    let mut firmware = boot(Scenario::Sleep.config());

    assert_eq!(firmware.dispatch(Event::StartUp), Flow::Halt);
    assert!(firmware.is_halted());
    assert_eq!(firmware.state(), State::Idle);
    assert_eq!(lines(&firmware), vec!["Sleeping...RAM OFF"]);

    let request = firmware.framework().sleep_request().copied().unwrap();
    assert_eq!(request.timer, WakeTimer::Timer0);
    assert_eq!(request.duration_ms, 3_600_000);
    assert!(request.periodic);
    assert!(request.ram_off);
}

#[test]
fn sleep_ram_retained_requests_retention() {
    let mut firmware = boot(Scenario::SleepRamRetained.config());

    assert_eq!(firmware.dispatch(Event::StartUp), Flow::Halt);
    assert_eq!(lines(&firmware), vec!["Sleeping...RAM ON"]);
    assert!(!firmware.framework().sleep_request().unwrap().ram_off);
}

#[test]
fn sleep_flushes_debug_output_before_halting() {
    let mut firmware = boot(Scenario::Sleep.config());
    firmware.dispatch(Event::StartUp);

    assert_eq!(firmware.framework().serial().flush_count(), 1);
}

#[test]
fn nothing_runs_after_halt() {
    let mut firmware = boot(Config {
        tx_enable: true,
        ..Scenario::Sleep.config()
    });
    firmware.dispatch(Event::StartUp);
    let output = firmware.framework().serial().output();

    assert_eq!(firmware.dispatch(Event::NewState), Flow::Halt);
    assert_eq!(
        firmware.dispatch(Event::TxComplete {
            cb_id: 1,
            success: true
        }),
        Flow::Halt
    );
    assert_eq!(firmware.dispatch(Event::StartUp), Flow::Halt);

    assert_eq!(firmware.state(), State::Idle);
    assert!(firmware.framework().transmissions().is_empty());
    assert_eq!(firmware.framework().serial().output(), output);
}

#[test]
fn transmit_off_idles_without_sending() {
    let mut firmware = boot(Scenario::WakeRxIdle.config());

    assert_eq!(firmware.dispatch(Event::StartUp), Flow::Continue);
    assert_eq!(
        lines(&firmware),
        vec!["RX_ENABLE: True", "TX_ENABLE: False", "Idling..."]
    );
    assert_eq!(firmware.state(), State::Idle);

    firmware.dispatch(Event::Tick);
    firmware.dispatch(Event::TxComplete {
        cb_id: 1,
        success: true,
    });
    assert_eq!(firmware.state(), State::Idle);
    assert!(firmware.framework().transmissions().is_empty());
    assert!(firmware.framework().sleep_request().is_none());
}

#[test]
fn transmit_on_sends_once_before_first_completion() {
    let mut firmware = boot(Scenario::WakeTx(2).config());

    assert_eq!(firmware.dispatch(Event::StartUp), Flow::Continue);
    assert_eq!(firmware.state(), State::Running);
    assert_eq!(
        lines(&firmware),
        vec![
            "RX_ENABLE: False",
            "TX_ENABLE: True",
            "TX_POWER: 2",
            "Start sending...",
        ]
    );
    assert_eq!(firmware.framework().transmissions().len(), 1);
    assert!(!firmware.application().send_pending());
}

#[test]
fn each_completion_yields_one_submission() {
    let mut firmware = boot(Scenario::WakeRxTx(0).config());
    firmware.dispatch(Event::StartUp);

    assert_eq!(run_events(&mut firmware, 10), 10);
    assert_eq!(firmware.framework().transmissions().len(), 11);
    assert!(!firmware.application().send_pending());
    assert_eq!(firmware.state(), State::Running);
}

#[test]
fn rejected_submission_is_not_retried() {
    let mut firmware = boot(Scenario::WakeTx(0).config());
    firmware.framework_mut().set_accept(false);
    firmware.dispatch(Event::StartUp);

    assert_eq!(firmware.framework().transmissions().len(), 1);
    assert_eq!(firmware.framework_mut().next_event(), None);

    // A later completion still triggers exactly one more attempt
    firmware.dispatch(Event::TxComplete {
        cb_id: 1,
        success: false,
    });
    assert_eq!(firmware.framework().transmissions().len(), 2);
    assert!(!firmware.application().send_pending());
}

#[test]
fn completion_with_failure_still_sends() {
    let mut firmware = boot(Scenario::WakeTx(1).config());
    firmware.dispatch(Event::StartUp);
    firmware.framework_mut().next_event();

    firmware.dispatch(Event::TxComplete {
        cb_id: 1,
        success: false,
    });
    assert_eq!(firmware.framework().transmissions().len(), 2);
}

#[test]
fn other_events_do_not_send() {
    let mut firmware = boot(Scenario::WakeTx(0).config());
    firmware.dispatch(Event::StartUp);

    firmware.dispatch(Event::Tick);
    firmware.dispatch(Event::NewState);
    firmware.dispatch(Event::Received {
        src_addr: 0x8100_0001,
        length: 80,
        lqi: 200,
    });
    firmware.dispatch(Event::Network { event: 1, arg: 0 });
    firmware.dispatch(Event::Hardware {
        device_id: 0,
        item_bitmap: 0,
    });

    assert_eq!(firmware.framework().transmissions().len(), 1);
}

#[test]
fn submitted_packets_are_bench_broadcasts() {
    let mut firmware = boot(Scenario::WakeTx(3).config());
    firmware.dispatch(Event::StartUp);
    run_events(&mut firmware, 4);

    let transmissions = firmware.framework().transmissions();
    assert_eq!(transmissions.len(), 5);
    for request in transmissions {
        assert_eq!(request.payload(), &BENCH_PAYLOAD[..]);
        assert_eq!(request.payload().len(), 80);
        assert_eq!(request.dst_addr, BROADCAST_ADDR);
        assert_eq!(request.src_addr, SERIAL_NUMBER);
        assert_eq!(request.retries, 9);
        assert!(!request.ack_req);
    }
}

#[test]
fn cold_start_brings_up_console_and_brown_out() {
    let firmware = boot(Scenario::Wake.config());
    let sim = firmware.framework();

    assert_eq!(sim.serial_config(), Some(&config::DEBUG_SERIAL));
    assert_eq!(sim.serial_config().unwrap().baud_rate, 115_200);
    assert_eq!(sim.debug_level(), Some(0));

    let brown_out = sim.brown_out().unwrap();
    assert_eq!(brown_out.threshold_mv, 2_000);
    assert!(!brown_out.reset_enabled);
    assert!(!brown_out.rising_interrupt);
    assert!(!brown_out.falling_interrupt);
}

#[test]
fn mac_stays_down_without_radio_use() {
    let firmware = boot(Scenario::Wake.config());
    assert!(firmware.framework().mac().is_none());

    let firmware = boot(Scenario::SleepRamRetained.config());
    assert!(firmware.framework().mac().is_none());
}

#[test]
fn radio_stays_asleep_in_closed_scenarios() {
    for scenario in [
        Scenario::Wake,
        Scenario::WakeAdcStandby,
        Scenario::WakeAdcMeasuring,
        Scenario::Sleep,
        Scenario::SleepRamRetained,
    ] {
        let mut firmware = boot(scenario.config());
        firmware.dispatch(Event::StartUp);
        firmware.dispatch(Event::Tick);
        firmware.main_tick();

        assert!(firmware.framework().mac().is_none(), "{:?}", scenario);
        assert!(firmware.framework().transmissions().is_empty());
    }
}

#[test]
fn mac_starts_with_radio_context() {
    let firmware = boot(Scenario::WakeRxTx(2).config());
    let mac = firmware.framework().mac().copied().unwrap();

    assert_eq!(mac.app_id, 0x6772_1122);
    assert_eq!(mac.channel, 15);
    assert!(mac.rx_on_idle);
    assert_eq!(mac.tx_power, 2);

    let firmware = boot(Scenario::WakeTx(1).config());
    assert!(!firmware.framework().mac().unwrap().rx_on_idle);
}

#[test]
fn invalid_config_is_rejected() {
    let result = Firmware::cold_start(SimFramework::new(1), Scenario::WakeTx(4).config());
    assert!(result.is_err());
}

#[test]
fn analog_standby_configures_regulator_only() {
    let mut firmware = boot(Scenario::WakeAdcStandby.config());
    firmware.dispatch(Event::StartUp);
    let sim = firmware.framework();

    assert_eq!(sim.analog(), Some(&config::ANALOG_SETUP));
    assert!(sim.adc().is_none());
    assert_eq!(
        lines(&firmware),
        vec!["RX_ENABLE: False", "TX_ENABLE: False", "Idling..."]
    );
}

#[test]
fn analog_measuring_starts_continuous_supply_sampling() {
    let mut firmware = boot(Scenario::WakeAdcMeasuring.config());
    firmware.dispatch(Event::StartUp);

    let adc = firmware.framework().adc().copied().unwrap();
    assert_eq!(adc.mode, AdcMode::Continuous);
    assert_eq!(adc.range, InputRange::Range2);
    assert_eq!(adc.source, AdcSource::SupplyVoltage);
}

#[test]
fn regulator_already_on_is_not_reconfigured() {
    let framework = SimFramework::new(SERIAL_NUMBER).with_regulator_on();
    let mut firmware =
        Firmware::cold_start(framework, Scenario::WakeAdcMeasuring.config()).unwrap();
    firmware.dispatch(Event::StartUp);

    assert!(firmware.framework().analog().is_none());
    assert!(firmware.framework().adc().is_some());
}

#[test]
fn analog_setup_runs_before_sleep() {
    let mut firmware = boot(Config {
        adc_power: true,
        ..Scenario::Sleep.config()
    });
    assert_eq!(firmware.dispatch(Event::StartUp), Flow::Halt);

    assert!(firmware.framework().analog().is_some());
    assert_eq!(lines(&firmware), vec!["Sleeping...RAM OFF"]);
}

#[test]
fn hooks_leave_state_untouched() {
    let mut firmware = boot(Scenario::WakeTx(0).config());
    firmware.dispatch(Event::StartUp);
    let output = firmware.framework().serial().output();

    firmware.warm_start();
    firmware.main_tick();
    assert!(!firmware.hardware_interrupt(3, 0x10));

    assert_eq!(firmware.state(), State::Running);
    assert_eq!(firmware.framework().transmissions().len(), 1);
    assert_eq!(firmware.framework().serial().output(), output);
}

#[test]
fn startup_is_ignored_while_running() {
    let mut firmware = boot(Scenario::WakeTx(0).config());
    firmware.dispatch(Event::StartUp);
    let output = firmware.framework().serial().output();

    firmware.dispatch(Event::StartUp);
    assert_eq!(firmware.framework().serial().output(), output);
    assert_eq!(firmware.framework().transmissions().len(), 1);
}

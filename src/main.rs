#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    use radio_current_bench::board::Board;
    use radio_current_bench::{Config, Event, Firmware, Flow};

    let board = match Board::take() {
        Some(board) => board,
        None => halt(),
    };
    let mut firmware = match Firmware::cold_start(board, Config::ACTIVE) {
        Ok(firmware) => firmware,
        Err(_) => halt(),
    };

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    let mut flow = firmware.dispatch(Event::StartUp);

    loop {
        if flow == Flow::Halt {
            if firmware.framework_mut().sleep_period() {
                firmware.warm_start();
            }
            continue;
        }

        if let Some(event) = firmware.framework_mut().poll_event() {
            flow = firmware.dispatch(event);
            continue;
        }

        firmware.main_tick();
        firmware.framework_mut().idle();
    }
}

#[cfg(target_arch = "avr")]
fn halt() -> ! {
    avr_device::interrupt::disable();
    #[allow(clippy::empty_loop)]
    loop {}
}

/// Transmit cycles the host run goes through before it stops
#[cfg(not(target_arch = "avr"))]
const HOST_TX_CYCLES: usize = 5;

#[cfg(not(target_arch = "avr"))]
fn main() {
    use radio_current_bench::sim::SimFramework;
    use radio_current_bench::{Config, Event, Firmware, Flow};

    let framework = SimFramework::new(0x8100_0001);
    let serial = framework.serial().clone();

    let mut firmware = match Firmware::cold_start(framework, Config::ACTIVE) {
        Ok(firmware) => firmware,
        Err(err) => {
            eprintln!("configuration rejected: {:?}", err);
            std::process::exit(1);
        }
    };

    let mut flow = firmware.dispatch(Event::StartUp);
    let mut cycles = 0;
    while flow == Flow::Continue && cycles < HOST_TX_CYCLES {
        match firmware.framework_mut().next_event() {
            Some(event) => {
                flow = firmware.dispatch(event);
                cycles += 1;
            }
            None => break,
        }
        firmware.main_tick();
    }

    for line in serial.lines() {
        println!("{}", line);
    }

    let sim = firmware.framework();
    println!("---");
    println!("state: {:?}", firmware.state());
    if let Some(request) = sim.sleep_request() {
        println!(
            "sleep: {} ms, periodic {}, ram off {}",
            request.duration_ms, request.periodic, request.ram_off
        );
    }
    for (i, request) in sim.transmissions().iter().enumerate() {
        println!(
            "tx {}: {:08x} -> {:08x}, {} bytes, {} attempts",
            i,
            request.src_addr,
            request.dst_addr,
            request.payload().len(),
            request.transmissions()
        );
    }
}

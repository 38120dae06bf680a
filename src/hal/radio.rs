//! On-chip 2.4 GHz transceiver (TRX24) of the ATmega128RFA1
//!
//! The transceiver registers live in extended I/O space and are accessed
//! directly by address.

use avr_device::interrupt::{self, Mutex};
use core::cell::Cell;

use super::settings::{batmon_value, tx_power_setting, TX_POWER_MASK};

const TRXPR: usize = 0x139;
const TRX_STATUS: usize = 0x141;
const TRX_STATE: usize = 0x142;
const TRX_CTRL_1: usize = 0x144;
const PHY_TX_PWR: usize = 0x145;
const PHY_CC_CCA: usize = 0x148;
const IRQ_MASK: usize = 0x14E;
const IRQ_STATUS: usize = 0x14F;
const BATMON: usize = 0x151;
const SHORT_ADDR_0: usize = 0x160;
const SHORT_ADDR_1: usize = 0x161;
const PAN_ID_0: usize = 0x162;
const PAN_ID_1: usize = 0x163;
const TST_RX_LENGTH: usize = 0x17B;
const TRXFBST: usize = 0x180;

// TRX_STATE commands
const CMD_TX_START: u8 = 0x02;
const CMD_FORCE_TRX_OFF: u8 = 0x03;
const CMD_RX_ON: u8 = 0x06;
const CMD_PLL_ON: u8 = 0x09;

// TRX_STATUS values
const STATUS_MASK: u8 = 0x1F;
const STATUS_RX_ON: u8 = 0x06;
const STATUS_TRX_OFF: u8 = 0x08;
const STATUS_PLL_ON: u8 = 0x09;

const SLPTR: u8 = 1 << 1;
const TX_AUTO_CRC_ON: u8 = 1 << 5;
const IRQ_TX_END: u8 = 1 << 6;
const IRQ_RX_END: u8 = 1 << 3;
/// CCA mode 1 (energy above threshold)
const CCA_MODE_ED: u8 = 0x20;

/// Largest frame buffer content including the length byte
pub const FRAME_BUFFER_LEN: usize = 128;

static TX_END: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));
static RX_END: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

#[inline]
fn read_reg(address: usize) -> u8 {
    unsafe { core::ptr::read_volatile(address as *const u8) }
}

#[inline]
fn write_reg(address: usize, value: u8) {
    unsafe { core::ptr::write_volatile(address as *mut u8, value) }
}

fn status() -> u8 {
    read_reg(TRX_STATUS) & STATUS_MASK
}

fn command(cmd: u8, expected: u8) {
    write_reg(TRX_STATE, cmd);
    while status() != expected {}
}

pub struct Radio {
    rx_on_idle: bool,
    // Registers other than TRXPR are unreachable while asleep
    asleep: bool,
}

impl Radio {
    /// Leaves the transceiver asleep until `wake`
    pub fn new() -> Self {
        let mut radio = Self {
            rx_on_idle: false,
            asleep: true,
        };
        radio.wake();
        radio.sleep();
        radio
    }

    /// Out of sleep into TRX_OFF; configuration registers need this first
    pub fn wake(&mut self) {
        if !self.asleep {
            return;
        }
        write_reg(TRXPR, read_reg(TRXPR) & !SLPTR);
        command(CMD_FORCE_TRX_OFF, STATUS_TRX_OFF);
        self.asleep = false;
    }

    pub fn set_channel(&mut self, channel: u8) {
        write_reg(PHY_CC_CCA, CCA_MODE_ED | (channel & 0x1F));
    }

    /// Level 0 (weakest) to 3 (strongest)
    pub fn set_tx_power(&mut self, level: u8) {
        let value = read_reg(PHY_TX_PWR) & !TX_POWER_MASK;
        write_reg(PHY_TX_PWR, value | tx_power_setting(level));
    }

    pub fn set_addresses(&mut self, pan_id: u16, short_addr: u16) {
        let [pan_lo, pan_hi] = pan_id.to_le_bytes();
        let [addr_lo, addr_hi] = short_addr.to_le_bytes();
        write_reg(PAN_ID_0, pan_lo);
        write_reg(PAN_ID_1, pan_hi);
        write_reg(SHORT_ADDR_0, addr_lo);
        write_reg(SHORT_ADDR_1, addr_hi);
    }

    /// Enables CRC generation and the end-of-frame interrupts, then idles
    pub fn start(&mut self, rx_on_idle: bool) {
        self.wake();
        self.rx_on_idle = rx_on_idle;
        write_reg(TRX_CTRL_1, read_reg(TRX_CTRL_1) | TX_AUTO_CRC_ON);
        write_reg(IRQ_STATUS, 0xFF);
        write_reg(IRQ_MASK, IRQ_TX_END | IRQ_RX_END);
        self.idle();
    }

    /// Receiver open or transceiver off, as configured
    pub fn idle(&mut self) {
        if self.rx_on_idle {
            command(CMD_RX_ON, STATUS_RX_ON);
        } else {
            command(CMD_FORCE_TRX_OFF, STATUS_TRX_OFF);
        }
    }

    /// `frame` starts with the PHR, as produced by `protocol::frame::encode`
    pub fn transmit(&mut self, frame: &[u8]) {
        // PLL_ON first so an incoming frame cannot overwrite the buffer
        command(CMD_PLL_ON, STATUS_PLL_ON);
        for (i, &byte) in frame.iter().take(FRAME_BUFFER_LEN).enumerate() {
            write_reg(TRXFBST + i, byte);
        }
        write_reg(TRX_STATE, CMD_TX_START);
    }

    /// Copies the last received PSDU without FCS; returns its length and LQI
    pub fn read_frame(&mut self, buf: &mut [u8]) -> (usize, u8) {
        let length = usize::from(read_reg(TST_RX_LENGTH));
        let psdu = length.saturating_sub(2).min(buf.len());
        for (i, byte) in buf.iter_mut().take(psdu).enumerate() {
            *byte = read_reg(TRXFBST + i);
        }
        // LQI follows the PSDU in the frame buffer
        let lqi = read_reg(TRXFBST + length.min(FRAME_BUFFER_LEN - 1));
        (psdu, lqi)
    }

    /// Transceiver off and asleep
    pub fn sleep(&mut self) {
        if self.asleep {
            return;
        }
        command(CMD_FORCE_TRX_OFF, STATUS_TRX_OFF);
        write_reg(TRXPR, read_reg(TRXPR) | SLPTR);
        self.asleep = true;
    }
}

impl Default for Radio {
    fn default() -> Self {
        Self::new()
    }
}

/// Supply monitor threshold in the low range (1.70 V + 50 mV steps).
/// The BAT_LOW interrupt stays masked; there is no handler for it.
pub fn set_battery_monitor(threshold_mv: u16) {
    write_reg(BATMON, batmon_value(read_reg(BATMON), threshold_mv));
}

/// True once per completed transmission
pub fn take_tx_end() -> bool {
    interrupt::free(|cs| TX_END.borrow(cs).replace(false))
}

/// True once per received frame
pub fn take_rx_end() -> bool {
    interrupt::free(|cs| RX_END.borrow(cs).replace(false))
}

pub fn event_pending() -> bool {
    interrupt::free(|cs| TX_END.borrow(cs).get() || RX_END.borrow(cs).get())
}

#[avr_device::interrupt(atmega128rfa1)]
fn TRX24_TX_END() {
    write_reg(IRQ_STATUS, IRQ_TX_END);
    interrupt::free(|cs| TX_END.borrow(cs).set(true));
}

#[avr_device::interrupt(atmega128rfa1)]
fn TRX24_RX_END() {
    write_reg(IRQ_STATUS, IRQ_RX_END);
    interrupt::free(|cs| RX_END.borrow(cs).set(true));
}

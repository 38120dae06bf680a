#![allow(clippy::missing_safety_doc)]

use avr_device::atmega128rfa1::USART0;
use avr_device::interrupt::{self, Mutex};
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use embedded_hal::serial;

use crate::config::{CPU_FREQ_HZ, UART_RX_QUEUE, UART_TX_QUEUE};

// UCSR0A
const RXC: u8 = 1 << 7;
const TXC: u8 = 1 << 6;
const U2X: u8 = 1 << 1;
// UCSR0B
const RXCIE: u8 = 1 << 7;
const UDRIE: u8 = 1 << 5;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;
// UCSR0C: asynchronous, 8 data bits, no parity, 1 stop bit
const FRAME_8N1: u8 = 0x06;

/// Rounded divisor in double speed mode
const fn ubrr_for(baud: u32) -> u16 {
    ((CPU_FREQ_HZ + 4 * baud) / (8 * baud) - 1) as u16
}

pub struct Queue<const N: usize> {
    data: [u8; N],
    head: usize,
    len: usize,
}

impl<const N: usize> Queue<N> {
    const fn new() -> Self {
        Self {
            data: [0; N],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, byte: u8) -> bool {
        if self.len == N {
            return false;
        }
        self.data[(self.head + self.len) % N] = byte;
        self.len += 1;
        true
    }

    fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.data[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(byte)
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// Queues shared with the interrupt handlers
static TX_QUEUE: Mutex<RefCell<Queue<UART_TX_QUEUE>>> = Mutex::new(RefCell::new(Queue::new()));
static RX_QUEUE: Mutex<RefCell<Queue<UART_RX_QUEUE>>> = Mutex::new(RefCell::new(Queue::new()));
// Set once a byte went to the shifter, cleared by a completed flush
static LOADED: Mutex<Cell<bool>> = Mutex::new(Cell::new(false));

/// Interrupt driven USART0
pub struct Uart {
    _private: (),
}

impl Uart {
    pub fn new(baud: u32) -> Self {
        unsafe {
            let p = USART0::ptr();

            (*p).ubrr0.write(|w| w.bits(ubrr_for(baud)));
            (*p).ucsr0a.write(|w| w.bits(U2X));
            (*p).ucsr0c.write(|w| w.bits(FRAME_8N1));
            // Enable TX, RX and RX interrupt
            (*p).ucsr0b.write(|w| w.bits(RXEN | TXEN | RXCIE));
        }

        Self { _private: () }
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        interrupt::free(|cs| RX_QUEUE.borrow(cs).borrow_mut().pop())
    }

    fn enable_udre_interrupt(&mut self) {
        unsafe {
            (*USART0::ptr())
                .ucsr0b
                .modify(|r, w| w.bits(r.bits() | UDRIE));
        }
    }
}

impl serial::Write<u8> for Uart {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        let queued = interrupt::free(|cs| TX_QUEUE.borrow(cs).borrow_mut().push(word));
        // Either way the data register interrupt has to drain the queue
        self.enable_udre_interrupt();
        if queued {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        interrupt::free(|cs| {
            if !TX_QUEUE.borrow(cs).borrow().is_empty() {
                return Err(nb::Error::WouldBlock);
            }
            let loaded = LOADED.borrow(cs);
            if !loaded.get() {
                return Ok(());
            }
            let status = unsafe { (*USART0::ptr()).ucsr0a.read().bits() };
            if status & TXC == 0 {
                return Err(nb::Error::WouldBlock);
            }
            loaded.set(false);
            Ok(())
        })
    }
}

impl serial::Read<u8> for Uart {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_byte().ok_or(nb::Error::WouldBlock)
    }
}

#[avr_device::interrupt(atmega128rfa1)]
fn USART0_RX() {
    unsafe {
        let p = USART0::ptr();
        if (*p).ucsr0a.read().bits() & RXC != 0 {
            let byte = (*p).udr0.read().bits();
            interrupt::free(|cs| {
                // Overflowing bytes are dropped
                RX_QUEUE.borrow(cs).borrow_mut().push(byte);
            });
        }
    }
}

#[avr_device::interrupt(atmega128rfa1)]
fn USART0_UDRE() {
    interrupt::free(|cs| unsafe {
        let p = USART0::ptr();
        if let Some(byte) = TX_QUEUE.borrow(cs).borrow_mut().pop() {
            // Writing one clears TXC so flush waits for this byte
            (*p).ucsr0a.modify(|r, w| w.bits((r.bits() & U2X) | TXC));
            (*p).udr0.write(|w| w.bits(byte));
            LOADED.borrow(cs).set(true);
        } else {
            // Queue empty - disable data register interrupt
            (*p).ucsr0b.modify(|r, w| w.bits(r.bits() & !UDRIE));
        }
    });
}

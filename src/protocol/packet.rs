//! Transmit request model

use super::frame::MAX_PAYLOAD;
use super::{PacketError, Result};

/// Link-layer broadcast destination
pub const BROADCAST_ADDR: u32 = 0xFFFF;

/// Filler carried by every bench broadcast
pub const BENCH_PAYLOAD: &[u8; 80] =
    b"01234567890123456789012345678901234567890123456789012345678901234567890123456789";

/// Extra attempts after the first transmission, ten frames in total
pub const BENCH_RETRIES: u8 = 9;
pub const BENCH_RETRY_INTERVAL_MS: u16 = 1;
pub const BENCH_CB_ID: u8 = 1;
pub const BENCH_SEQ: u8 = 1;

const _: () = assert!(BENCH_PAYLOAD.len() <= MAX_PAYLOAD);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    AppData = 0x00,
}

/// One entry of the MAC transmit queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub src_addr: u32,
    pub dst_addr: u32,
    pub ack_req: bool,
    /// Repeats after the first attempt
    pub retries: u8,
    pub retry_interval_ms: u16,
    /// Upper bound of the random delay before the first attempt
    pub max_delay_ms: u16,
    pub command: Command,
    /// Handed back in the transmit-complete callback
    pub cb_id: u8,
    pub seq: u8,
    payload: [u8; MAX_PAYLOAD],
    length: u8,
}

impl TxRequest {
    /// Request with every option zeroed and an empty payload
    pub fn new(src_addr: u32, dst_addr: u32) -> Self {
        Self {
            src_addr,
            dst_addr,
            ack_req: false,
            retries: 0,
            retry_interval_ms: 0,
            max_delay_ms: 0,
            command: Command::AppData,
            cb_id: 0,
            seq: 0,
            payload: [0; MAX_PAYLOAD],
            length: 0,
        }
    }

    /// The fixed broadcast the transmit scenarios send over and over
    pub fn bench_broadcast(src_addr: u32) -> Self {
        let mut request = Self::new(src_addr, BROADCAST_ADDR);
        request.ack_req = false;
        request.retries = BENCH_RETRIES;
        request.retry_interval_ms = BENCH_RETRY_INTERVAL_MS;
        request.max_delay_ms = 0;
        request.command = Command::AppData;
        request.cb_id = BENCH_CB_ID;
        request.seq = BENCH_SEQ;
        request.payload[..BENCH_PAYLOAD.len()].copy_from_slice(BENCH_PAYLOAD);
        request.length = BENCH_PAYLOAD.len() as u8;
        request
    }

    pub fn set_payload(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_PAYLOAD {
            return Err(PacketError::PayloadTooLong(data.len()));
        }
        self.payload[..data.len()].copy_from_slice(data);
        self.length = data.len() as u8;
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.length as usize]
    }

    pub fn is_broadcast(&self) -> bool {
        self.dst_addr == BROADCAST_ADDR
    }

    /// First attempt plus every retry
    pub fn transmissions(&self) -> u16 {
        u16::from(self.retries) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bench_broadcast_fields() {
        let request = TxRequest::bench_broadcast(0x8100_1234);
        assert_eq!(request.src_addr, 0x8100_1234);
        assert!(request.is_broadcast());
        assert!(!request.ack_req);
        assert_eq!(request.retries, 9);
        assert_eq!(request.transmissions(), 10);
        assert_eq!(request.retry_interval_ms, 1);
        assert_eq!(request.max_delay_ms, 0);
        assert_eq!(request.command, Command::AppData);
        assert_eq!(request.cb_id, 1);
        assert_eq!(request.seq, 1);
        assert_eq!(request.payload().len(), 80);
        assert_eq!(&request.payload()[..12], b"012345678901");
        assert_eq!(&request.payload()[70..], b"0123456789");
    }

    #[test]
    fn payload_is_digits_in_sequence() {
        let request = TxRequest::bench_broadcast(0);
        for (i, byte) in request.payload().iter().enumerate() {
            assert_eq!(*byte, b'0' + (i % 10) as u8);
        }
    }

    #[test]
    fn set_payload_rejects_oversize() {
        let mut request = TxRequest::new(1, 2);
        let big = [0xAAu8; MAX_PAYLOAD + 1];
        assert_eq!(
            request.set_payload(&big),
            Err(PacketError::PayloadTooLong(MAX_PAYLOAD + 1))
        );
        assert!(request.payload().is_empty());

        request.set_payload(&big[..MAX_PAYLOAD]).unwrap();
        assert_eq!(request.payload().len(), MAX_PAYLOAD);
    }
}

//! IEEE 802.15.4 data frame layout of a transmit request
//!
//! ```text
//! PHR | FCF(2) SEQ PAN(2) DST(2) SRC(2) | APP_ID(4) CMD SRC(4) DST(4) | PAYLOAD | FCS(2)
//! ```
//!
//! Multi-byte fields are little endian. The FCS is appended by the
//! transceiver, so `encode` only reserves room for it in the PHR.

use super::packet::TxRequest;
use super::{PacketError, Result};

/// Largest PSDU the PHY accepts
pub const PHY_MAX_FRAME: usize = 127;
pub const FCS_LEN: usize = 2;
pub const MAC_HEADER_LEN: usize = 9;
pub const APP_HEADER_LEN: usize = 13;
pub const MAX_PAYLOAD: usize = PHY_MAX_FRAME - MAC_HEADER_LEN - APP_HEADER_LEN - FCS_LEN;

/// Data frame, PAN id compression, short destination and source
const FCF_DATA_SHORT: u16 = 0x8841;
const FCF_ACK_REQUEST: u16 = 1 << 5;

/// Addressing of a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub seq: u8,
    pub pan_id: u16,
    pub app_id: u32,
    pub command: u8,
    pub src_addr: u32,
    pub dst_addr: u32,
}

/// PAN id derived from the application id
pub fn pan_id(app_id: u32) -> u16 {
    (app_id & 0xFFFF) as u16
}

/// Writes PHR and PSDU (without FCS) into `buf`, returning the bytes used
pub fn encode(request: &TxRequest, app_id: u32, seq: u8, buf: &mut [u8]) -> Result<usize> {
    let payload = request.payload();
    let psdu_len = MAC_HEADER_LEN + APP_HEADER_LEN + payload.len() + FCS_LEN;
    if psdu_len > PHY_MAX_FRAME {
        return Err(PacketError::PayloadTooLong(payload.len()));
    }
    let used = 1 + psdu_len - FCS_LEN;
    if buf.len() < used {
        return Err(PacketError::BufferTooSmall);
    }

    let mut fcf = FCF_DATA_SHORT;
    if request.ack_req {
        fcf |= FCF_ACK_REQUEST;
    }

    buf[0] = psdu_len as u8;
    buf[1..3].copy_from_slice(&fcf.to_le_bytes());
    buf[3] = seq;
    buf[4..6].copy_from_slice(&pan_id(app_id).to_le_bytes());
    buf[6..8].copy_from_slice(&(request.dst_addr as u16).to_le_bytes());
    buf[8..10].copy_from_slice(&(request.src_addr as u16).to_le_bytes());
    buf[10..14].copy_from_slice(&app_id.to_le_bytes());
    buf[14] = request.command as u8;
    buf[15..19].copy_from_slice(&request.src_addr.to_le_bytes());
    buf[19..23].copy_from_slice(&request.dst_addr.to_le_bytes());
    buf[23..used].copy_from_slice(payload);

    Ok(used)
}

/// Splits a received PSDU (FCS already stripped) into header and payload
pub fn decode(psdu: &[u8]) -> Result<(FrameHeader, &[u8])> {
    let header_len = MAC_HEADER_LEN + APP_HEADER_LEN;
    if psdu.len() < header_len {
        return Err(PacketError::BufferTooSmall);
    }

    let u16_at = |i: usize| u16::from_le_bytes([psdu[i], psdu[i + 1]]);
    let u32_at = |i: usize| u32::from_le_bytes([psdu[i], psdu[i + 1], psdu[i + 2], psdu[i + 3]]);

    let header = FrameHeader {
        seq: psdu[2],
        pan_id: u16_at(3),
        app_id: u32_at(9),
        command: psdu[13],
        src_addr: u32_at(14),
        dst_addr: u32_at(18),
    };
    Ok((header, &psdu[header_len..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::{BENCH_PAYLOAD, BROADCAST_ADDR};

    #[test]
    fn bench_broadcast_layout() {
        let request = TxRequest::bench_broadcast(0x8100_ABCD);
        let mut buf = [0u8; PHY_MAX_FRAME + 1];
        let used = encode(&request, 0x6772_1122, 7, &mut buf).unwrap();

        assert_eq!(used, 1 + 9 + 13 + 80);
        assert_eq!(buf[0], 104);
        assert_eq!(&buf[1..3], &[0x41, 0x88]);
        assert_eq!(buf[3], 7);
        assert_eq!(&buf[4..6], &[0x22, 0x11]);
        assert_eq!(&buf[6..8], &[0xFF, 0xFF]);
        assert_eq!(&buf[8..10], &[0xCD, 0xAB]);
        assert_eq!(&buf[10..14], &[0x22, 0x11, 0x72, 0x67]);
        assert_eq!(buf[14], 0x00);
        assert_eq!(&buf[15..19], &[0xCD, 0xAB, 0x00, 0x81]);
        assert_eq!(&buf[19..23], &[0xFF, 0xFF, 0x00, 0x00]);
        assert_eq!(&buf[23..used], &BENCH_PAYLOAD[..]);
    }

    #[test]
    fn ack_request_sets_fcf_bit() {
        let mut request = TxRequest::new(1, 2);
        request.ack_req = true;
        let mut buf = [0u8; 64];
        encode(&request, 0, 0, &mut buf).unwrap();
        assert_eq!(&buf[1..3], &[0x61, 0x88]);
    }

    #[test]
    fn rejects_short_buffer() {
        let request = TxRequest::bench_broadcast(1);
        let mut buf = [0u8; 50];
        assert_eq!(
            encode(&request, 0, 0, &mut buf),
            Err(PacketError::BufferTooSmall)
        );
    }

    #[test]
    fn largest_payload_fills_the_phy_frame() {
        let mut request = TxRequest::new(1, BROADCAST_ADDR);
        request.set_payload(&[0x5A; MAX_PAYLOAD]).unwrap();
        let mut buf = [0u8; PHY_MAX_FRAME + 1];
        let used = encode(&request, 0, 0, &mut buf).unwrap();
        assert_eq!(buf[0] as usize, PHY_MAX_FRAME);
        assert_eq!(used, PHY_MAX_FRAME + 1 - FCS_LEN);
    }

    #[test]
    fn decode_reads_back_addressing() {
        let request = TxRequest::bench_broadcast(0x0102_0304);
        let mut buf = [0u8; PHY_MAX_FRAME + 1];
        let used = encode(&request, 0x6772_1122, 42, &mut buf).unwrap();

        let (header, payload) = decode(&buf[1..used]).unwrap();
        assert_eq!(header.seq, 42);
        assert_eq!(header.pan_id, 0x1122);
        assert_eq!(header.app_id, 0x6772_1122);
        assert_eq!(header.command, 0);
        assert_eq!(header.src_addr, 0x0102_0304);
        assert_eq!(header.dst_addr, 0xFFFF);
        assert_eq!(payload, &BENCH_PAYLOAD[..]);
    }

    #[test]
    fn decode_rejects_truncated_header() {
        assert_eq!(decode(&[0x41, 0x88, 1]), Err(PacketError::BufferTooSmall));
    }
}

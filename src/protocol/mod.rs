//! Packets handed to the radio transmit queue and their over-the-air layout

pub mod frame;
pub mod packet;

pub use crate::error::PacketError;
pub use packet::{Command, TxRequest, BENCH_PAYLOAD, BROADCAST_ADDR};

pub type Result<T> = core::result::Result<T, PacketError>;

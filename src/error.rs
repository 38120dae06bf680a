//! Error types shared across the crate

/// Scenario record rejected by `Config::validate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    TxPowerOutOfRange(u8),
    ChannelOutOfRange(u8),
}

/// Packet construction and frame encoding failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    /// Payload longer than a single radio frame can carry
    PayloadTooLong(usize),
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Config(ConfigError),
    Packet(PacketError),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<PacketError> for Error {
    fn from(err: PacketError) -> Self {
        Error::Packet(err)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

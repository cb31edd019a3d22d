use thiserror::Error;

pub type Result<T> = std::result::Result<T, NatError>;

/// Reasons a buffer cannot be viewed as an IPv4 packet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NatError {
    #[error("Buffer of {0} bytes is too short for an IPv4 header")]
    TooShort(usize),

    #[error("Not an IPv4 packet (version {0})")]
    NotIpv4(u8),

    #[error("Invalid IPv4 header length: {0} bytes")]
    BadHeaderLength(usize),

    #[error("Invalid IPv4 total length {total} for a {available}-byte buffer")]
    BadTotalLength { total: usize, available: usize },

    #[error("Invalid packet layout: {0}")]
    InvalidLayout(String),
}

//! Error types for frame encoding and decoding.

use thiserror::Error;

/// Errors surfaced by the frame codec.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The payload does not fit in a single frame.
    ///
    /// On the decode path this marks foreign traffic: any capture whose
    /// length field exceeds the protocol maximum is some other protocol's
    /// frame, since that region of a standard Ethernet header holds an
    /// EtherType value above 1500.
    #[error("payload length {len} exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// The capture is shorter than the fixed header or its declared payload.
    #[error("truncated frame: {len} bytes captured, {need} needed")]
    Truncated { len: usize, need: usize },
}

/// Result alias for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;

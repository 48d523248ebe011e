//! Raw Ethernet frame layout and codec for the DTB link protocol.
//!
//! A DTB speaks a private link-layer protocol directly on the wire. Every
//! frame carries:
//! - A 6-byte destination hardware address
//! - A 6-byte source hardware address
//! - A 2-byte big-endian payload length, at most [`MAX_PAYLOAD`]
//! - The payload itself
//!
//! This crate owns that layout and nothing else: no sockets, no session
//! state, no retransmission. The session layer above decides what goes in a
//! payload and what to do with a decoded frame.

pub mod addr;
pub mod codec;
pub mod dump;
pub mod error;

pub use addr::{MacAddr, ParseMacError};
pub use codec::{decode_frame, encode_frame, Frame, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD};
pub use dump::HexDump;
pub use error::{FrameError, Result};

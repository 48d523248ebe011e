//! Packet-capture link primitives for the DTB Ethernet transport.
//!
//! The lowest layer of dtblink. A DTB shares an Ethernet segment with its
//! host, so the host listens promiscuously: the capture handle delivers
//! every frame on the wire, its own transmissions included, and the layers
//! above sort out which frames matter.
//!
//! This crate provides:
//! - [`RawLink`], the send/receive seam the session layer is written
//!   against
//! - [`PacketSocket`], the live `AF_PACKET` implementation (Linux)
//! - [`enumerate_interfaces`], the device listing behind transport
//!   enumeration (Linux)
//!
//! Framing and frame filtering live in `dtblink-wire` and the session layer
//! respectively; this crate moves raw bytes.

pub mod error;
pub mod traits;

#[cfg(target_os = "linux")]
pub mod enumerate;
#[cfg(target_os = "linux")]
pub mod packet;

pub use error::{LinkError, Result};
pub use traits::{RawLink, RECV_BUFFER_LEN};

#[cfg(target_os = "linux")]
pub use enumerate::enumerate_interfaces;
#[cfg(target_os = "linux")]
pub use packet::{PacketSocket, DEFAULT_POLL_TIMEOUT};

//! Byte-stream transport to DTB test instruments over raw Ethernet.
//!
//! A DTB shares an Ethernet segment with its host and speaks a private
//! link-layer protocol. dtblink turns that unreliable, MTU-bounded medium
//! into the ordered byte stream the RPC layer above consumes: outgoing
//! bytes are chunked into frames, captured frames are filtered and
//! reassembled in arrival order, and reads wait within an explicit poll
//! budget instead of blocking on the wire.
//!
//! # Crate Structure
//!
//! - [`wire`] — Frame layout, hardware addresses, and the codec
//! - [`capture`] — The raw capture link and interface enumeration
//! - [`Session`] — The protocol core: chunking, filtering, reassembly
//! - [`Transport`] — The contract RPC callers program against, implemented
//!   by `EthTransport` (Linux) and [`NullTransport`]
//!
//! # Example
//!
//! ```no_run
//! use dtblink::{EthTransport, Transport, DEFAULT_READ_BUDGET};
//!
//! # fn main() -> dtblink::Result<()> {
//! let mut dtb = EthTransport::new();
//! dtb.open("eth0")?;
//! dtb.write(b"GetVersion")?;
//! dtb.flush()?;
//!
//! let mut version = [0u8; 2];
//! dtb.read(&mut version, DEFAULT_READ_BUDGET)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod null;
pub mod session;
pub mod transport;

#[cfg(target_os = "linux")]
pub mod eth;

/// Re-export frame codec types.
pub mod wire {
    pub use dtblink_wire::*;
}

/// Re-export raw link types.
pub mod capture {
    pub use dtblink_capture::*;
}

pub use error::{Result, TransportError};
pub use null::NullTransport;
pub use session::{Session, DEFAULT_READ_BUDGET};
pub use transport::{ErrorCode, Transport};

#[cfg(target_os = "linux")]
pub use eth::{EthConfig, EthTransport};

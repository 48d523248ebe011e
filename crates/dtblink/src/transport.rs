//! The capability contract every concrete transport implements.

use crate::error::Result;

/// Stable code describing the most recent transport failure.
///
/// The RPC layer above reports these to operators and scripts, so both the
/// numeric values and the messages stay fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// No failure recorded.
    #[default]
    Ok = 0,
    /// The underlying link failed or could not be opened.
    Link = 1,
    /// A read exhausted its poll budget.
    Timeout = 2,
    /// Frame encoding failed.
    Frame = 3,
    /// The transport cannot accept writes.
    WriteFailed = 4,
    /// The transport cannot produce reads.
    ReadFailed = 5,
}

impl ErrorCode {
    /// Stable operator-facing text for a code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Ok => "no error",
            ErrorCode::Link => "link error",
            ErrorCode::Timeout => "read timeout",
            ErrorCode::Frame => "frame encoding error",
            ErrorCode::WriteFailed => "transport cannot accept writes",
            ErrorCode::ReadFailed => "transport cannot produce reads",
        }
    }
}

/// One open channel to an instrument, or the capacity to open one.
///
/// The RPC marshalling layer holds a `dyn Transport` and never names a
/// concrete implementation, so instrument logic works unchanged over
/// Ethernet today and whatever medium comes next. A "device" is whatever
/// the implementation's enumeration yields; for `EthTransport` that is a
/// capture interface name.
///
/// Writes buffer; only [`flush`](Transport::flush) and a full buffer put
/// bytes on the wire. Reads are exact-fill and bounded by an explicit poll
/// budget rather than wall-clock time.
pub trait Transport {
    /// Open the transport against a named device, closing any previous
    /// connection first.
    fn open(&mut self, device: &str) -> Result<()>;

    /// True while the transport holds an open connection.
    fn connected(&self) -> bool;

    /// Append bytes to the outgoing buffer, transmitting full frames as
    /// the buffer fills.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Transmit whatever is buffered, ending the current frame early.
    fn flush(&mut self) -> Result<()>;

    /// Discard buffered outgoing bytes and queued incoming bytes without
    /// touching the wire.
    fn clear(&mut self) -> Result<()>;

    /// Fill `out` exactly, tolerating at most `budget` empty polls of the
    /// link while waiting for more data.
    fn read(&mut self, out: &mut [u8], budget: u32) -> Result<()>;

    /// Release the connection. Safe to call repeatedly or while closed.
    fn close(&mut self);

    /// Code of the most recent failed operation.
    fn last_error(&self) -> ErrorCode;

    /// Stable text for an error code.
    fn error_message(&self, code: ErrorCode) -> &'static str {
        code.message()
    }

    /// Snapshot the device list, restart the enumeration cursor, and
    /// return how many devices are available.
    fn enum_first(&mut self) -> Result<usize>;

    /// The next device name, advancing the cursor, or `None` past the end.
    fn enum_next(&mut self) -> Option<String>;

    /// The device name at `pos` in the enumeration, without moving the
    /// cursor.
    fn enum_at(&mut self, pos: usize) -> Option<String>;
}

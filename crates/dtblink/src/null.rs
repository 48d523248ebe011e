//! The placeholder transport.

use dtblink_capture::LinkError;

use crate::error::{Result, TransportError};
use crate::transport::{ErrorCode, Transport};

/// A transport that is never connected.
///
/// What callers hold before a real transport has been selected, so the
/// slot is never empty and mistakes fail loudly instead of dereferencing
/// nothing: writes and reads return contract-level errors, open fails, and
/// the inert operations succeed as no-ops.
#[derive(Debug, Default)]
pub struct NullTransport {
    last_error: ErrorCode,
}

impl NullTransport {
    /// Create the inert transport.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for NullTransport {
    fn open(&mut self, _device: &str) -> Result<()> {
        self.last_error = ErrorCode::Link;
        Err(TransportError::Link(LinkError::NotOpen))
    }

    fn connected(&self) -> bool {
        false
    }

    fn write(&mut self, _bytes: &[u8]) -> Result<()> {
        self.last_error = ErrorCode::WriteFailed;
        Err(TransportError::WriteFailed)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&mut self, _out: &mut [u8], _budget: u32) -> Result<()> {
        self.last_error = ErrorCode::ReadFailed;
        Err(TransportError::ReadFailed)
    }

    fn close(&mut self) {}

    fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    fn enum_first(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn enum_next(&mut self) -> Option<String> {
        None
    }

    fn enum_at(&mut self, _pos: usize) -> Option<String> {
        None
    }
}

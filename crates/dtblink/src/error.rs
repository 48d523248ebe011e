//! Error types for the transport layer.

use dtblink_capture::LinkError;
use dtblink_wire::FrameError;

use crate::transport::ErrorCode;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying link failed or could not be opened. Fatal to the
    /// current connection; callers must re-open.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Frame encoding failed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// No pending data and no valid frame arrived within the poll budget.
    /// Recoverable: the caller may retry, resynchronize with a clear, or
    /// abandon the logical request.
    #[error("read timed out after a budget of {polls} empty polls")]
    Timeout { polls: u32 },

    /// The transport cannot accept writes.
    #[error("transport cannot accept writes")]
    WriteFailed,

    /// The transport cannot produce reads.
    #[error("transport cannot produce reads")]
    ReadFailed,
}

impl TransportError {
    /// The stable code recorded by `Transport::last_error`.
    pub fn code(&self) -> ErrorCode {
        match self {
            TransportError::Link(_) => ErrorCode::Link,
            TransportError::Frame(_) => ErrorCode::Frame,
            TransportError::Timeout { .. } => ErrorCode::Timeout,
            TransportError::WriteFailed => ErrorCode::WriteFailed,
            TransportError::ReadFailed => ErrorCode::ReadFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

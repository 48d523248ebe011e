/// Errors that can occur on the raw capture link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Failed to open a capture handle on the interface.
    #[error("failed to open capture link on {interface}: {source}")]
    Open {
        interface: String,
        source: std::io::Error,
    },

    /// The named interface does not exist on this host.
    #[error("no such interface: {interface}")]
    NoSuchInterface { interface: String },

    /// The interface's hardware address could not be determined.
    #[error("failed to query hardware address of {interface}: {source}")]
    HwAddr {
        interface: String,
        source: std::io::Error,
    },

    /// Failed to transmit a frame.
    #[error("link send error: {0}")]
    Send(std::io::Error),

    /// The link accepted only part of a frame.
    #[error("short send: {sent} of {len} bytes")]
    TruncatedSend { sent: usize, len: usize },

    /// Receiving failed for a reason other than an empty poll window.
    #[error("link receive error: {0}")]
    Recv(std::io::Error),

    /// Interface enumeration failed.
    #[error("interface enumeration failed: {0}")]
    Enumerate(std::io::Error),

    /// The link is not open.
    #[error("link not open")]
    NotOpen,
}

pub type Result<T> = std::result::Result<T, LinkError>;

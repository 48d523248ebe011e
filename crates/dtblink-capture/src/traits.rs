use crate::error::Result;

/// Receive scratch sizing for `recv_next` buffers, comfortably above the
/// largest frame the link can deliver.
pub const RECV_BUFFER_LEN: usize = 2048;

/// One raw, MTU-bounded link on a shared segment.
///
/// The capture facility behind an implementation sees every frame on the
/// segment, the host's own transmissions included; callers are responsible
/// for recognizing those echoes. Each receive attempt is bounded by the
/// implementation's poll window, and the caller decides how many empty
/// windows it will tolerate.
///
/// Implementations over real hardware live behind this trait so the session
/// layer can be driven by scripted links in tests.
pub trait RawLink {
    /// Transmit one frame.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Capture the next frame into `buf` and return its length, or `None`
    /// when the poll window elapses with nothing captured.
    ///
    /// `buf` should be at least [`RECV_BUFFER_LEN`] bytes; a capture longer
    /// than `buf` may be truncated by the implementation.
    fn recv_next(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;
}

use bytes::{BufMut, BytesMut};

use crate::addr::MacAddr;
use crate::error::{FrameError, Result};

/// Frame header: destination (6) + source (6) + length (2) = 14 bytes.
pub const HEADER_LEN: usize = 14;

/// Maximum payload per frame, matching the Ethernet MTU.
pub const MAX_PAYLOAD: usize = 1500;

/// Largest valid frame on the wire (header plus a full payload).
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD;

/// A decoded frame borrowing the captured bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Destination hardware address.
    pub dst: MacAddr,
    /// Source hardware address.
    pub src: MacAddr,
    /// Exactly the declared payload, trailing padding excluded.
    pub payload: &'a [u8],
}

impl Frame<'_> {
    /// The wire size of this frame (header + payload, padding excluded).
    pub fn wire_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬──────────────────┬───────────┬──────────────────┐
/// │ Destination (6B) │ Source (6B)      │ Length    │ Payload          │
/// │                  │                  │ (2B BE)   │ (Length bytes)   │
/// └──────────────────┴──────────────────┴───────────┴──────────────────┘
/// ```
///
/// The layout coincides with a standard Ethernet header whose EtherType
/// field carries the payload length instead, which is what keeps DTB frames
/// distinguishable from ordinary traffic: real EtherType values are above
/// [`MAX_PAYLOAD`]. There is no checksum; frame integrity is left to the
/// link hardware.
pub fn encode_frame(dst: MacAddr, src: MacAddr, payload: &[u8], out: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    out.reserve(HEADER_LEN + payload.len());
    out.put_slice(&dst.octets());
    out.put_slice(&src.octets());
    out.put_u16(payload.len() as u16);
    out.put_slice(payload);
    Ok(())
}

/// Decode one captured frame.
///
/// Captures arrive whole, so there is no partial-read case: a capture
/// shorter than the header or its declared payload is damaged, and a length
/// field above [`MAX_PAYLOAD`] is another protocol's EtherType. Trailing
/// bytes past the declared payload are the link's minimum-size padding and
/// are excluded from the result.
pub fn decode_frame(raw: &[u8]) -> Result<Frame<'_>> {
    if raw.len() < HEADER_LEN {
        return Err(FrameError::Truncated {
            len: raw.len(),
            need: HEADER_LEN,
        });
    }

    let dst = MacAddr::new(raw[0..6].try_into().unwrap());
    let src = MacAddr::new(raw[6..12].try_into().unwrap());
    let payload_len = u16::from_be_bytes(raw[12..14].try_into().unwrap()) as usize;

    if payload_len > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            len: payload_len,
            max: MAX_PAYLOAD,
        });
    }

    let total = HEADER_LEN + payload_len;
    if raw.len() < total {
        return Err(FrameError::Truncated {
            len: raw.len(),
            need: total,
        });
    }

    Ok(Frame {
        dst,
        src,
        payload: &raw[HEADER_LEN..total],
    })
}

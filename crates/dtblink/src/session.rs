//! The byte-stream protocol core over one open raw link.

use bytes::BytesMut;
use tracing::{debug, trace};

use dtblink_capture::{RawLink, RECV_BUFFER_LEN};
use dtblink_wire::{decode_frame, encode_frame, HexDump, MacAddr, MAX_PAYLOAD};

use crate::error::{Result, TransportError};

/// Default number of empty polls a read tolerates before timing out.
pub const DEFAULT_READ_BUDGET: u32 = 1000;

/// Outgoing payload accumulator, bounded by [`MAX_PAYLOAD`].
///
/// Appends are capped at the remaining capacity and the session flushes a
/// full buffer before appending more, so no frame ever exceeds the MTU.
#[derive(Debug, Default)]
struct TxBuffer {
    buf: BytesMut,
}

impl TxBuffer {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn is_full(&self) -> bool {
        self.buf.len() == MAX_PAYLOAD
    }

    /// Append as much of `bytes` as capacity allows, returning how many
    /// bytes were taken.
    fn fill_from(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(MAX_PAYLOAD - self.buf.len());
        self.buf.extend_from_slice(&bytes[..take]);
        take
    }

    fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    fn clear(&mut self) {
        self.buf.clear();
    }
}

/// The byte-stream protocol core over one open raw link.
///
/// Outgoing bytes accumulate into MTU-sized frames addressed to the peer;
/// captured frames are filtered and their payloads reassembled into an
/// ordered incoming byte queue. The filter drops three kinds of capture
/// without charging the caller's poll budget: frames that do not decode,
/// frames of other protocols on the segment, and the session's own
/// looped-back transmissions.
///
/// Generic over [`RawLink`] so the protocol logic can be driven by scripted
/// links in tests and by `PacketSocket` in production.
pub struct Session<L> {
    link: L,
    local: MacAddr,
    peer: MacAddr,
    tx: TxBuffer,
    rx: BytesMut,
    frame_buf: BytesMut,
    recv_buf: Vec<u8>,
}

impl<L: RawLink> Session<L> {
    /// Wrap an open link with empty transmit and receive state.
    ///
    /// `local` must be the address the link transmits from; it is how the
    /// session recognizes its own echoes. `peer` is where outgoing frames
    /// go, typically [`MacAddr::BROADCAST`] until an instrument address has
    /// been pinned.
    pub fn new(link: L, local: MacAddr, peer: MacAddr) -> Self {
        Self {
            link,
            local,
            peer,
            tx: TxBuffer::default(),
            rx: BytesMut::new(),
            frame_buf: BytesMut::new(),
            recv_buf: vec![0u8; RECV_BUFFER_LEN],
        }
    }

    /// The session's own hardware address.
    pub fn local_addr(&self) -> MacAddr {
        self.local
    }

    /// The peer address outgoing frames are sent to.
    pub fn peer_addr(&self) -> MacAddr {
        self.peer
    }

    /// Redirect subsequent frames to a new peer address.
    pub fn set_peer(&mut self, peer: MacAddr) {
        self.peer = peer;
    }

    /// Get a reference to the underlying link.
    pub fn get_ref(&self) -> &L {
        &self.link
    }

    /// Get a mutable reference to the underlying link.
    pub fn get_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the session, returning the underlying link.
    pub fn into_inner(self) -> L {
        self.link
    }

    /// Append bytes to the outgoing buffer, transmitting a full frame
    /// whenever the buffer reaches [`MAX_PAYLOAD`].
    ///
    /// A buffer left exactly full is not transmitted until more bytes
    /// arrive or [`flush`](Session::flush) is called.
    pub fn write(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            if self.tx.is_full() {
                self.flush()?;
            }
            let taken = self.tx.fill_from(bytes);
            bytes = &bytes[taken..];
        }
        Ok(())
    }

    /// Transmit buffered bytes as one frame; a no-op when nothing is
    /// buffered. On a send failure the buffered bytes are retained.
    pub fn flush(&mut self) -> Result<()> {
        if self.tx.is_empty() {
            return Ok(());
        }
        self.frame_buf.clear();
        encode_frame(self.peer, self.local, self.tx.as_slice(), &mut self.frame_buf)?;
        self.link.send(&self.frame_buf)?;
        debug!(dst = %self.peer, len = self.tx.len(), "sent frame");
        self.tx.clear();
        Ok(())
    }

    /// Discard buffered outgoing bytes and queued incoming bytes.
    ///
    /// Purely local: nothing is transmitted and nothing is drained from
    /// the wire, so anything discarded here is gone for good.
    pub fn clear(&mut self) {
        self.tx.clear();
        self.rx.clear();
    }

    /// Fill `out` exactly from the incoming queue, polling the link while
    /// the queue is short.
    ///
    /// Only empty polls count against `budget`; captures that arrive and
    /// are dropped cost nothing, so heavy unrelated traffic on the segment
    /// cannot starve a read that data is actually reaching. A zero budget
    /// fails on the first empty poll.
    pub fn read(&mut self, out: &mut [u8], budget: u32) -> Result<()> {
        let mut empty_polls: u32 = 0;
        while self.rx.len() < out.len() {
            match self.link.recv_next(&mut self.recv_buf)? {
                Some(len) => self.enqueue_captured(len),
                None => {
                    empty_polls += 1;
                    if empty_polls >= budget {
                        debug!(budget, pending = self.rx.len(), "read timed out");
                        return Err(TransportError::Timeout { polls: budget });
                    }
                }
            }
        }
        let head = self.rx.split_to(out.len());
        out.copy_from_slice(&head);
        Ok(())
    }

    /// Decode one capture and queue its payload, or drop it.
    fn enqueue_captured(&mut self, len: usize) {
        let raw = &self.recv_buf[..len];
        let frame = match decode_frame(raw) {
            Ok(frame) => frame,
            Err(err) => {
                trace!(len, %err, "dropped capture");
                return;
            }
        };
        if frame.src == self.local {
            trace!(len = frame.payload.len(), "dropped self-echo");
            return;
        }
        trace!(
            src = %frame.src,
            len = frame.payload.len(),
            data = %HexDump(frame.payload),
            "queued frame"
        );
        self.rx.extend_from_slice(frame.payload);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bytes::BufMut;

    use dtblink_capture::{LinkError, Result as LinkResult};
    use dtblink_wire::HEADER_LEN;

    use super::*;

    const LOCAL: MacAddr = MacAddr::new([0xd4, 0x3d, 0x7e, 0x00, 0x12, 0xfe]);
    const PEER: MacAddr = MacAddr::new([0x00, 0x90, 0xf5, 0xaa, 0xbb, 0xcc]);

    enum RxStep {
        Capture(Vec<u8>),
        Empty,
        Fail,
    }

    /// A scripted link: `recv_next` replays queued steps, `send` records
    /// frames.
    #[derive(Default)]
    struct FakeLink {
        steps: VecDeque<RxStep>,
        sent: Vec<Vec<u8>>,
        polls: usize,
        fail_send: bool,
    }

    impl FakeLink {
        fn push_frame(&mut self, dst: MacAddr, src: MacAddr, payload: &[u8]) {
            let mut buf = BytesMut::new();
            encode_frame(dst, src, payload, &mut buf).unwrap();
            self.steps.push_back(RxStep::Capture(buf.to_vec()));
        }

        fn push_raw(&mut self, raw: &[u8]) {
            self.steps.push_back(RxStep::Capture(raw.to_vec()));
        }

        fn push_empty(&mut self, count: usize) {
            for _ in 0..count {
                self.steps.push_back(RxStep::Empty);
            }
        }
    }

    impl RawLink for FakeLink {
        fn send(&mut self, frame: &[u8]) -> LinkResult<()> {
            if self.fail_send {
                return Err(LinkError::NotOpen);
            }
            self.sent.push(frame.to_vec());
            Ok(())
        }

        fn recv_next(&mut self, buf: &mut [u8]) -> LinkResult<Option<usize>> {
            self.polls += 1;
            match self.steps.pop_front() {
                Some(RxStep::Capture(raw)) => {
                    buf[..raw.len()].copy_from_slice(&raw);
                    Ok(Some(raw.len()))
                }
                Some(RxStep::Fail) => Err(LinkError::NotOpen),
                Some(RxStep::Empty) | None => Ok(None),
            }
        }
    }

    fn session() -> Session<FakeLink> {
        Session::new(FakeLink::default(), LOCAL, PEER)
    }

    #[test]
    fn test_flush_emits_one_addressed_frame() {
        let mut session = session();
        session.write(b"SetDAC 25 1000").unwrap();
        session.flush().unwrap();

        let sent = &session.get_ref().sent;
        assert_eq!(sent.len(), 1);
        let frame = decode_frame(&sent[0]).unwrap();
        assert_eq!(frame.dst, PEER);
        assert_eq!(frame.src, LOCAL);
        assert_eq!(frame.payload, b"SetDAC 25 1000");
    }

    #[test]
    fn test_write_chunks_at_payload_boundary() {
        let data: Vec<u8> = (0..2 * MAX_PAYLOAD + 1).map(|i| i as u8).collect();

        let mut session = session();
        session.write(&data).unwrap();
        // Two full frames go out mid-write; the one-byte tail waits.
        assert_eq!(session.get_ref().sent.len(), 2);
        session.flush().unwrap();

        let sent = &session.get_ref().sent;
        assert_eq!(sent.len(), 3);
        let lens: Vec<usize> = sent
            .iter()
            .map(|raw| decode_frame(raw).unwrap().payload.len())
            .collect();
        assert_eq!(lens, [MAX_PAYLOAD, MAX_PAYLOAD, 1]);

        let mut reassembled = Vec::new();
        for raw in sent {
            reassembled.extend_from_slice(decode_frame(raw).unwrap().payload);
        }
        assert_eq!(reassembled, data);
    }

    #[test]
    fn test_exactly_one_payload_stays_buffered_until_flush() {
        let mut session = session();
        session.write(&vec![0u8; MAX_PAYLOAD]).unwrap();
        assert!(session.get_ref().sent.is_empty());
        session.flush().unwrap();
        assert_eq!(session.get_ref().sent.len(), 1);
    }

    #[test]
    fn test_flush_empty_is_noop() {
        let mut session = session();
        session.flush().unwrap();
        assert!(session.get_ref().sent.is_empty());
    }

    #[test]
    fn test_read_reassembles_fifo_across_frames() {
        let mut session = session();
        session.get_mut().push_frame(LOCAL, PEER, b"abc");
        session.get_mut().push_frame(LOCAL, PEER, b"def");

        let mut out = [0u8; 4];
        session.read(&mut out, 1).unwrap();
        assert_eq!(&out, b"abcd");

        let mut rest = [0u8; 2];
        session.read(&mut rest, 1).unwrap();
        assert_eq!(&rest, b"ef");
    }

    #[test]
    fn test_leftover_bytes_need_no_polls() {
        let mut session = session();
        session.get_mut().push_frame(LOCAL, PEER, b"abcdef");

        let mut out = [0u8; 2];
        session.read(&mut out, 1).unwrap();
        let polls_after_first = session.get_ref().polls;

        let mut rest = [0u8; 4];
        session.read(&mut rest, 1).unwrap();
        assert_eq!(&rest, b"cdef");
        assert_eq!(session.get_ref().polls, polls_after_first);
    }

    #[test]
    fn test_self_echo_is_dropped_for_free() {
        let mut session = session();
        // An echo, an empty poll, then the real answer. With a budget of
        // two the read only survives if the echo costs nothing.
        session.get_mut().push_frame(PEER, LOCAL, b"echoed command");
        session.get_mut().push_empty(1);
        session.get_mut().push_frame(LOCAL, PEER, b"answer");

        let mut out = [0u8; 6];
        session.read(&mut out, 2).unwrap();
        assert_eq!(&out, b"answer");
    }

    #[test]
    fn test_echo_only_traffic_still_times_out() {
        let mut session = session();
        for _ in 0..5 {
            session.get_mut().push_frame(PEER, LOCAL, b"echo");
        }

        let mut out = [0u8; 1];
        let err = session.read(&mut out, 3).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { polls: 3 }));
        // Five echoes plus three empty polls, none of the echoes charged.
        assert_eq!(session.get_ref().polls, 8);
    }

    #[test]
    fn test_malformed_and_foreign_frames_cost_no_budget() {
        let mut session = session();
        // Too short to carry a header.
        session.get_mut().push_raw(&[0x00; 5]);
        // An IPv4 frame: EtherType 0x0800 in the length position.
        let mut foreign = BytesMut::new();
        foreign.put_slice(&PEER.octets());
        foreign.put_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        foreign.put_u16(0x0800);
        foreign.put_slice(&[0u8; 46]);
        session.get_mut().push_raw(&foreign);
        // Header promises more payload than was captured.
        let mut short = BytesMut::new();
        encode_frame(LOCAL, PEER, b"cut off", &mut short).unwrap();
        session.get_mut().push_raw(&short[..HEADER_LEN + 3]);

        session.get_mut().push_frame(LOCAL, PEER, b"ok");

        let mut out = [0u8; 2];
        session.read(&mut out, 1).unwrap();
        assert_eq!(&out, b"ok");
        assert_eq!(session.get_ref().polls, 4);
    }

    #[test]
    fn test_timeout_after_exact_budget() {
        let mut session = session();
        let mut out = [0u8; 1];
        let err = session.read(&mut out, 5).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { polls: 5 }));
        assert_eq!(session.get_ref().polls, 5);
    }

    #[test]
    fn test_zero_budget_times_out_on_first_empty_poll() {
        let mut session = session();
        let mut out = [0u8; 1];
        let err = session.read(&mut out, 0).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert_eq!(session.get_ref().polls, 1);
    }

    #[test]
    fn test_zero_length_read_never_polls() {
        let mut session = session();
        session.read(&mut [], 0).unwrap();
        assert_eq!(session.get_ref().polls, 0);
    }

    #[test]
    fn test_clear_discards_both_directions() {
        let mut session = session();
        session.write(b"never sent").unwrap();
        session.get_mut().push_frame(LOCAL, PEER, b"AB");

        let mut out = [0u8; 1];
        session.read(&mut out, 1).unwrap();

        session.clear();
        // The buffered write is gone.
        session.flush().unwrap();
        assert!(session.get_ref().sent.is_empty());
        // So is the undelivered remainder of the frame.
        let err = session.read(&mut out, 1).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[test]
    fn test_broadcast_destination_is_accepted() {
        let mut session = session();
        session
            .get_mut()
            .push_frame(MacAddr::BROADCAST, PEER, b"hello");

        let mut out = [0u8; 5];
        session.read(&mut out, 1).unwrap();
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn test_set_peer_redirects_frames() {
        let other = MacAddr::new([0x00, 0x90, 0xf5, 0x00, 0x00, 0x07]);
        let mut session = session();
        session.set_peer(other);
        session.write(b"x").unwrap();
        session.flush().unwrap();

        let frame = decode_frame(&session.get_ref().sent[0]).unwrap();
        assert_eq!(frame.dst, other);
        assert_eq!(session.peer_addr(), other);
    }

    #[test]
    fn test_send_failure_keeps_bytes_buffered() {
        let mut session = session();
        session.write(b"retry me").unwrap();
        session.get_mut().fail_send = true;
        assert!(matches!(
            session.flush(),
            Err(TransportError::Link(LinkError::NotOpen))
        ));

        session.get_mut().fail_send = false;
        session.flush().unwrap();
        let frame = decode_frame(&session.get_ref().sent[0]).unwrap();
        assert_eq!(frame.payload, b"retry me");
    }

    #[test]
    fn test_recv_failure_propagates() {
        let mut session = session();
        session.get_mut().steps.push_back(RxStep::Fail);

        let mut out = [0u8; 1];
        let err = session.read(&mut out, 10).unwrap_err();
        assert!(matches!(err, TransportError::Link(_)));
    }
}

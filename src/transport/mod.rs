//! Ring transport: the single UDP socket each peer owns, the
//! send-to-successor path, and the receive loop's ring-consumption rule
//! (spec §4.2) — decode, detect lap-complete, else process-locally-then-
//! forward.

use std::collections::HashSet;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::error::Result;
use crate::protocol::{BinaryProtocol, Frame, Message, PlayerId, BROADCAST};

/// Frames larger than this never occur (5-byte header + 255-byte payload
/// cap), but a generous read buffer avoids truncating a valid frame.
const RECV_BUFFER_SIZE: usize = 512;

/// Bound on the duplicate-suppression cache (spec §7): under a correct
/// ring this should never fill, so a simple cap-and-clear is sufficient.
const DEDUP_CACHE_CAP: usize = 1024;

/// What the receive loop found after applying the ring-consumption rule.
pub enum RingEvent {
    /// `origin_id` was this peer's own: the frame completed one full lap.
    LapComplete(Frame),
    /// Not our origin: the frame's un-reencoded bytes are kept alongside
    /// the decoded view so the caller can forward exactly what arrived
    /// after processing it locally (when addressed to us).
    Local { frame: Frame, raw: Vec<u8> },
}

pub struct RingTransport {
    socket: UdpSocket,
    self_id: PlayerId,
    successor: SocketAddr,
    seq_counter: u8,
    seen: HashSet<(PlayerId, u8, u8)>,
}

impl RingTransport {
    pub async fn bind(listen: SocketAddr, successor: SocketAddr, self_id: PlayerId) -> Result<Self> {
        let socket = UdpSocket::bind(listen).await?;
        Ok(Self {
            socket,
            self_id,
            successor,
            seq_counter: 0,
            seen: HashSet::new(),
        })
    }

    /// Build and send a frame originated by this peer, assigning the next
    /// per-origin sequence number.
    pub async fn originate(&mut self, message: &Message, destination_id: u8) -> Result<Frame> {
        let destination_id = if message.is_broadcast_kind() {
            BROADCAST
        } else {
            destination_id
        };

        let frame = Frame {
            msg_type: message.msg_type(),
            origin_id: self.self_id,
            destination_id,
            seq_num: self.seq_counter,
            payload: message.encode_payload(),
        };
        self.seq_counter = self.seq_counter.wrapping_add(1);

        let bytes = BinaryProtocol::encode(&frame)?;
        self.socket.send_to(&bytes, self.successor).await?;
        tracing::debug!(
            msg_type = frame.msg_type,
            destination = frame.destination_id,
            seq = frame.seq_num,
            "originated frame"
        );
        Ok(frame)
    }

    /// Forward `raw` bytes to the successor unchanged (no header mutation).
    pub async fn forward(&self, raw: &[u8]) -> Result<()> {
        self.socket.send_to(raw, self.successor).await?;
        Ok(())
    }

    /// Block for the next frame, applying decode, origin-consumption, and
    /// duplicate suppression. Malformed frames and already-seen
    /// `(origin, seq, type)` triples are dropped silently and the loop
    /// retries internally.
    pub async fn recv_event(&mut self) -> Result<RingEvent> {
        loop {
            let mut buf = [0u8; RECV_BUFFER_SIZE];
            let (n, _) = self.socket.recv_from(&mut buf).await?;
            let raw = buf[..n].to_vec();

            let frame = match BinaryProtocol::decode(&raw) {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::debug!(%err, "dropping malformed frame");
                    continue;
                }
            };

            if frame.origin_id == self.self_id {
                return Ok(RingEvent::LapComplete(frame));
            }

            let key = (frame.origin_id, frame.seq_num, frame.msg_type);
            if self.seen.contains(&key) {
                tracing::debug!(?key, "dropping duplicate frame");
                continue;
            }
            if self.seen.len() >= DEDUP_CACHE_CAP {
                self.seen.clear();
            }
            self.seen.insert(key);

            return Ok(RingEvent::Local { frame, raw });
        }
    }
}

/// Whether `frame` is addressed to `self_id`, used by callers deciding
/// whether to hand a [`RingEvent::Local`] frame to the phase machine.
pub fn addressed_to(frame: &Frame, self_id: PlayerId) -> bool {
    frame.destination_id == self_id || frame.is_broadcast()
}

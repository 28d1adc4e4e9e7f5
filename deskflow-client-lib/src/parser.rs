//! Stream parser (component C2): frames length-prefixed messages out of an
//! arbitrarily fragmented byte stream.

use crate::error::WireError;
use crate::wire::{self, AnyMessage, WireMessage};

/// Owns the append-only receive buffer and the read cursor into it.
/// Everything before the cursor has already been delivered to the caller.
#[derive(Debug, Default)]
pub struct StreamParser {
    buffer: Vec<u8>,
    cursor: usize,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly-read socket bytes to the buffer. Never blocks, never
    /// parses — framing happens in `next_msg`/`next_handshake_msg`.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// How many unconsumed bytes are currently buffered (for tests/metrics).
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    fn peek_frame_len(&self) -> Option<usize> {
        let remaining = self.buffer.len() - self.cursor;
        if remaining < 4 {
            return None;
        }
        let start = self.cursor;
        let len = u32::from_be_bytes([
            self.buffer[start],
            self.buffer[start + 1],
            self.buffer[start + 2],
            self.buffer[start + 3],
        ]) as usize;
        if remaining < 4 + len {
            return None;
        }
        Some(len)
    }

    /// Consumes one full frame (length prefix included) and returns its
    /// body, or `None` if the buffer doesn't yet hold a complete frame.
    fn take_frame(&mut self) -> Option<Vec<u8>> {
        let len = self.peek_frame_len()?;
        let start = self.cursor + 4;
        let body = self.buffer[start..start + len].to_vec();
        self.cursor = start + len;
        self.compact();
        Some(body)
    }

    /// Optimization, not part of the contract: drop already-delivered bytes
    /// once they're more than half the buffer.
    fn compact(&mut self) {
        if self.cursor > self.buffer.len() / 2 {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    /// Attempts to frame one message and decode it specifically as `T`,
    /// whose wire identity is the literal byte string `expected` (the
    /// handshake messages use the 7-byte `"Synergy"` prefix rather than a
    /// 4-byte registry code). Returns `Ok(None)` if no complete frame is
    /// buffered yet.
    pub fn next_handshake_msg<T: WireMessage>(
        &mut self,
        expected: &'static [u8],
    ) -> Result<Option<T>, WireError> {
        let Some(body) = self.take_frame() else {
            return Ok(None);
        };
        if !body.starts_with(expected) {
            let got_len = expected.len().min(body.len());
            return Err(WireError::HandshakeMismatch {
                expected: expected.to_vec(),
                got: body[..got_len].to_vec(),
            });
        }
        wire::unpack::<T>(&body).map(Some)
    }

    /// Attempts to frame one message and decode it by looking its code up
    /// in the registry. Returns `Ok(None)` if no complete frame is buffered
    /// yet; an unrecognized code decodes to `AnyMessage::Unknown` rather
    /// than erroring.
    pub fn next_msg(&mut self) -> Result<Option<AnyMessage>, WireError> {
        let Some(body) = self.take_frame() else {
            return Ok(None);
        };
        if body.len() < 4 {
            return Err(WireError::ShortBody);
        }
        let code = [body[0], body[1], body[2], body[3]];
        wire::registry().decode(code, &body[4..]).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::messages::{CalvMsg, CinnMsg, HelloMsg};

    #[test]
    fn returns_none_until_a_full_frame_is_buffered() {
        let mut p = StreamParser::new();
        p.feed(&[0, 0, 0, 4]);
        assert_eq!(p.next_msg().unwrap(), None);
        p.feed(b"CALV");
        let msg = p.next_msg().unwrap().unwrap();
        assert!(matches!(msg, AnyMessage::Calv(_)));
    }

    #[test]
    fn feeds_one_byte_at_a_time_still_yields_exactly_one_message() {
        let frame = wire::pack_for_socket(&HelloMsg {
            protocol_name: "Synergy".into(),
            major: 1,
            minor: 6,
        });
        let mut p = StreamParser::new();
        for b in &frame {
            assert_eq!(p.next_handshake_msg::<HelloMsg>(b"Synergy").unwrap(), None);
            p.feed(std::slice::from_ref(b));
        }
        let msg = p.next_handshake_msg::<HelloMsg>(b"Synergy").unwrap();
        assert_eq!(
            msg,
            Some(HelloMsg { protocol_name: "Synergy".into(), major: 1, minor: 6 })
        );
    }

    #[test]
    fn handshake_mismatch_on_wrong_code() {
        let mut p = StreamParser::new();
        let frame = wire::pack_for_socket(&CalvMsg {});
        p.feed(&frame);
        let err = p.next_handshake_msg::<HelloMsg>(b"Synergy").unwrap_err();
        assert!(matches!(err, WireError::HandshakeMismatch { .. }));
    }

    #[test]
    fn dispatch_order_matches_framed_order() {
        let mut p = StreamParser::new();
        p.feed(&wire::pack_for_socket(&CinnMsg {
            entry_x: 1,
            entry_y: 2,
            sequence: 1,
            mod_mask: 0,
        }));
        p.feed(&wire::pack_for_socket(&CalvMsg {}));
        let first = p.next_msg().unwrap().unwrap();
        let second = p.next_msg().unwrap().unwrap();
        assert!(matches!(first, AnyMessage::Cinn(_)));
        assert!(matches!(second, AnyMessage::Calv(_)));
        assert_eq!(p.next_msg().unwrap(), None);
    }

    #[test]
    fn unknown_code_is_recovered_locally() {
        let mut p = StreamParser::new();
        let mut body = b"ZZZZ".to_vec();
        body.extend_from_slice(b"hi");
        let mut frame = (body.len() as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(&body);
        p.feed(&frame);
        let msg = p.next_msg().unwrap().unwrap();
        match msg {
            AnyMessage::Unknown { code, body } => {
                assert_eq!(&code, b"ZZZZ");
                assert_eq!(body, b"hi");
            }
            _ => panic!("expected unknown"),
        }
    }
}

//! Wire codec and schema registry (component C1).
//!
//! `pack`/`unpack` are the generic engine; [`messages`] declares every
//! concrete message type against that engine; [`registry`] maps codes to
//! types for the post-handshake message stream.

pub mod codec;
pub mod messages;
pub mod registry;

use crate::error::WireError;
pub use codec::{FieldKind, FieldValue, IntWidth, ListElem, Value};
pub use messages::{MsgCode, WireMessage};
pub use registry::{global as registry, AnyMessage};

/// Packs a message's code and body fields. Does not include the 4-byte
/// length prefix a socket frame needs — use [`pack_for_socket`] for that.
pub fn pack<T: WireMessage>(msg: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(T::CODE.len() + 16);
    out.extend_from_slice(T::CODE);
    out.extend(codec::pack_fields(T::schema(), &msg.to_values()));
    out
}

/// Packs a message and prepends the 4-byte big-endian length prefix that
/// counts everything after itself, ready to write directly to the socket.
pub fn pack_for_socket<T: WireMessage>(msg: &T) -> Vec<u8> {
    let body = pack(msg);
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(&body);
    out
}

/// Unpacks `body` (bytes after the code) into a concrete message type.
pub fn unpack<T: WireMessage>(body: &[u8]) -> Result<T, WireError> {
    let values = codec::unpack_fields(T::schema(), body)?;
    T::from_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use messages::CalvMsg;

    #[test]
    fn pack_for_socket_prepends_length_of_remainder_only() {
        let bytes = pack_for_socket(&CalvMsg {});
        // 4 (code) + 0 body fields = 4
        assert_eq!(&bytes[..4], &4u32.to_be_bytes());
        assert_eq!(&bytes[4..8], b"CALV");
    }
}

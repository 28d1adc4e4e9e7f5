//! Concrete message types and their declarative schemas.
//!
//! Every type here is a literal struct with a literal schema array — there
//! is no derive macro and no runtime reflection. `define_message!` only
//! saves typing the same `WireMessage` boilerplate by hand for each of the
//! ~30 message types; it expands to exactly what you'd write out longhand.

use crate::error::WireError;
use crate::wire::codec::{FieldKind, FieldValue, IntWidth, Value};

/// Four-byte ASCII message code for ordinary (post-handshake) messages, or
/// the full literal prefix (`b"Synergy"`) for the two handshake messages.
pub type MsgCode = &'static [u8];

/// A message type that knows how to describe and convert its own fields.
/// The generic pack/unpack engine in [`crate::wire::codec`] does the actual
/// byte shuffling; this trait only supplies the per-type schema and the
/// struct <-> `Vec<Value>` conversion.
pub trait WireMessage: Sized {
    const CODE: MsgCode;

    fn schema() -> &'static [FieldKind];
    fn to_values(&self) -> Vec<Value>;
    fn from_values(values: Vec<Value>) -> Result<Self, WireError>;
}

macro_rules! define_message {
    ($(#[$meta:meta])* $name:ident, $code:expr, { $($field:ident : $ty:ty => $kind:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: $ty,)*
        }

        impl WireMessage for $name {
            const CODE: MsgCode = $code;

            fn schema() -> &'static [FieldKind] {
                const SCHEMA: &[FieldKind] = &[$($kind),*];
                SCHEMA
            }

            #[allow(clippy::vec_init_then_push)]
            fn to_values(&self) -> Vec<Value> {
                vec![$( FieldValue::to_value(&self.$field) ),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_values(values: Vec<Value>) -> Result<Self, WireError> {
                let mut it = values.into_iter();
                $(
                    let $field = <$ty as FieldValue>::from_value(
                        it.next().ok_or(WireError::ShortBody)?
                    )?;
                )*
                Ok(Self { $($field),* })
            }
        }
    };
}

use IntWidth::{Four, One, Two};

// --- Handshake (special-cased in the parser, not routed through the
// registry: their identifying prefix is the 7-byte literal "Synergy", not a
// 4-byte code). ---

define_message!(
    /// Server's greeting: protocol name and version it speaks.
    HelloMsg, b"Synergy", {
        protocol_name: String => FieldKind::FixStr(7),
        major: u16 => FieldKind::FixValU(Two),
        minor: u16 => FieldKind::FixValU(Two),
    }
);

define_message!(
    /// Client's reply: echoes the protocol identifiers and states its name.
    HelloBackMsg, b"Synergy", {
        protocol_name: String => FieldKind::FixStr(7),
        major: u16 => FieldKind::FixValU(Two),
        minor: u16 => FieldKind::FixValU(Two),
        name: String => FieldKind::VarStr,
    }
);

// --- Lifecycle ---

define_message!(CalvMsg, b"CALV", {});
define_message!(CbyeMsg, b"CBYE", {});
define_message!(
    CinnMsg, b"CINN", {
        entry_x: i16 => FieldKind::FixValI(Two),
        entry_y: i16 => FieldKind::FixValI(Two),
        sequence: u32 => FieldKind::FixValU(Four),
        mod_mask: u16 => FieldKind::FixValU(Two),
    }
);
define_message!(CoutMsg, b"COUT", {});
define_message!(CiakMsg, b"CIAK", {});
define_message!(CnopMsg, b"CNOP", {});
define_message!(CropMsg, b"CROP", {});
define_message!(CsecMsg, b"CSEC", { state: bool => FieldKind::FixValU(One) });
define_message!(
    CclpMsg, b"CCLP", {
        identifier: String => FieldKind::FixStr(1),
        sequence: u32 => FieldKind::FixValU(Four),
    }
);

// --- Keyboard ---

define_message!(
    DkdnMsg, b"DKDN", {
        key_id: u16 => FieldKind::FixValU(Two),
        mod_mask: u16 => FieldKind::FixValU(Two),
        key_button: u16 => FieldKind::FixValU(Two),
    }
);
define_message!(
    DkdlMsg, b"DKDL", {
        key_id: u16 => FieldKind::FixValU(Two),
        mod_mask: u16 => FieldKind::FixValU(Two),
        key_button: u16 => FieldKind::FixValU(Two),
        language: String => FieldKind::VarStr,
    }
);
define_message!(
    DkrpMsg, b"DKRP", {
        key_id: u16 => FieldKind::FixValU(Two),
        mod_mask: u16 => FieldKind::FixValU(Two),
        repeat_count: u16 => FieldKind::FixValU(Two),
        key_button: u16 => FieldKind::FixValU(Two),
        language: String => FieldKind::VarStr,
    }
);
define_message!(
    DkupMsg, b"DKUP", {
        key_id: u16 => FieldKind::FixValU(Two),
        mod_mask: u16 => FieldKind::FixValU(Two),
        repeat_count: u16 => FieldKind::FixValU(Two),
        key_button: u16 => FieldKind::FixValU(Two),
    }
);

// --- Mouse ---

define_message!(DmdnMsg, b"DMDN", { button: u8 => FieldKind::FixValU(One) });
define_message!(DmupMsg, b"DMUP", { button: u8 => FieldKind::FixValU(One) });
define_message!(
    DmmvMsg, b"DMMV", {
        x: i16 => FieldKind::FixValI(Two),
        y: i16 => FieldKind::FixValI(Two),
    }
);
define_message!(
    DmrmMsg, b"DMRM", {
        dx: i16 => FieldKind::FixValI(Two),
        dy: i16 => FieldKind::FixValI(Two),
    }
);
define_message!(
    DmwmMsg, b"DMWM", {
        x_delta: i16 => FieldKind::FixValI(Two),
        y_delta: i16 => FieldKind::FixValI(Two),
    }
);

// --- Screen info ---

define_message!(QinfMsg, b"QINF", {});
define_message!(
    DinfMsg, b"DINF", {
        left: i16 => FieldKind::FixValI(Two),
        top: i16 => FieldKind::FixValI(Two),
        width: u16 => FieldKind::FixValU(Two),
        height: u16 => FieldKind::FixValU(Two),
        warp: u16 => FieldKind::FixValU(Two),
        mouse_x: i16 => FieldKind::FixValI(Two),
        mouse_y: i16 => FieldKind::FixValI(Two),
    }
);

// --- Errors ---

define_message!(EbadMsg, b"EBAD", {});
define_message!(EbsyMsg, b"EBSY", {});
define_message!(EunkMsg, b"EUNK", {});
define_message!(
    EicvMsg, b"EICV", {
        major: u16 => FieldKind::FixValU(Two),
        minor: u16 => FieldKind::FixValU(Two),
    }
);

// --- Opaque-to-the-core payloads (decoded, logged, not interpreted) ---

define_message!(
    LsynMsg, b"LSYN", { lang_list: Vec<String> => FieldKind::VarList(crate::wire::codec::ListElem::Str) }
);
define_message!(SecnMsg, b"SECN", { app_name: String => FieldKind::VarStr });
define_message!(
    DclpMsg, b"DCLP", {
        identifier: u8 => FieldKind::FixValU(One),
        sequence: u32 => FieldKind::FixValU(Four),
        flag: bool => FieldKind::FixValU(One),
        data: String => FieldKind::VarStr,
    }
);
define_message!(
    DdrgMsg, b"DDRG", {
        file_count: u32 => FieldKind::FixValU(Four),
        file_paths: Vec<String> => FieldKind::VarList(crate::wire::codec::ListElem::Str),
    }
);
define_message!(
    DftrMsg, b"DFTR", {
        mark: u8 => FieldKind::FixValU(One),
        data: String => FieldKind::VarStr,
    }
);
define_message!(
    DsopMsg, b"DSOP", {
        options: Vec<(String, i32)> => FieldKind::VarList(crate::wire::codec::ListElem::KeyI32),
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{pack, unpack};

    #[test]
    fn hello_back_round_trips() {
        let msg = HelloBackMsg {
            protocol_name: "Synergy".into(),
            major: 1,
            minor: 6,
            name: "Pynergy".into(),
        };
        let packed = pack(&msg);
        // code (7) + major(2) + minor(2) + len(4) + "Pynergy"(7) = 22
        assert_eq!(packed.len(), 22);
        let unpacked: HelloBackMsg = unpack(&packed[7..]).unwrap();
        assert_eq!(unpacked, msg);
    }

    #[test]
    fn cinn_round_trips() {
        let msg = CinnMsg {
            entry_x: 100,
            entry_y: 200,
            sequence: 1,
            mod_mask: 0,
        };
        let packed = pack(&msg);
        let unpacked: CinnMsg = unpack(&packed[4..]).unwrap();
        assert_eq!(unpacked, msg);
    }

    #[test]
    fn dsop_round_trips_key_value_pairs() {
        let msg = DsopMsg {
            options: vec![("halfDuplexCapsLock".into(), 1), ("heartbeat".into(), 5000)],
        };
        let packed = pack(&msg);
        let unpacked: DsopMsg = unpack(&packed[4..]).unwrap();
        assert_eq!(unpacked, msg);
    }
}

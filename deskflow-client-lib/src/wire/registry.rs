//! Code-to-type registry and the `AnyMessage` union the parser decodes into.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::WireError;
use crate::wire::codec::pack_fields;
use crate::wire::messages::*;
use crate::wire::unpack;

/// Every message type the client understands once past the handshake,
/// plus a catch-all for codes the registry has no type for.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMessage {
    Calv(CalvMsg),
    Cbye(CbyeMsg),
    Cinn(CinnMsg),
    Cout(CoutMsg),
    Ciak(CiakMsg),
    Cnop(CnopMsg),
    Crop(CropMsg),
    Csec(CsecMsg),
    Cclp(CclpMsg),
    Dkdn(DkdnMsg),
    Dkdl(DkdlMsg),
    Dkrp(DkrpMsg),
    Dkup(DkupMsg),
    Dmdn(DmdnMsg),
    Dmup(DmupMsg),
    Dmmv(DmmvMsg),
    Dmrm(DmrmMsg),
    Dmwm(DmwmMsg),
    Qinf(QinfMsg),
    Dinf(DinfMsg),
    Ebad(EbadMsg),
    Ebsy(EbsyMsg),
    Eunk(EunkMsg),
    Eicv(EicvMsg),
    Lsyn(LsynMsg),
    Secn(SecnMsg),
    Dclp(DclpMsg),
    Ddrg(DdrgMsg),
    Dftr(DftrMsg),
    Dsop(DsopMsg),
    /// A frame with a code the registry has no type for. Carried untouched
    /// so a handler can log-and-continue.
    Unknown { code: [u8; 4], body: Vec<u8> },
}

impl AnyMessage {
    /// The four-byte code this message was (or would be) framed with.
    pub fn code(&self) -> [u8; 4] {
        match self {
            AnyMessage::Calv(_) => *b"CALV",
            AnyMessage::Cbye(_) => *b"CBYE",
            AnyMessage::Cinn(_) => *b"CINN",
            AnyMessage::Cout(_) => *b"COUT",
            AnyMessage::Ciak(_) => *b"CIAK",
            AnyMessage::Cnop(_) => *b"CNOP",
            AnyMessage::Crop(_) => *b"CROP",
            AnyMessage::Csec(_) => *b"CSEC",
            AnyMessage::Cclp(_) => *b"CCLP",
            AnyMessage::Dkdn(_) => *b"DKDN",
            AnyMessage::Dkdl(_) => *b"DKDL",
            AnyMessage::Dkrp(_) => *b"DKRP",
            AnyMessage::Dkup(_) => *b"DKUP",
            AnyMessage::Dmdn(_) => *b"DMDN",
            AnyMessage::Dmup(_) => *b"DMUP",
            AnyMessage::Dmmv(_) => *b"DMMV",
            AnyMessage::Dmrm(_) => *b"DMRM",
            AnyMessage::Dmwm(_) => *b"DMWM",
            AnyMessage::Qinf(_) => *b"QINF",
            AnyMessage::Dinf(_) => *b"DINF",
            AnyMessage::Ebad(_) => *b"EBAD",
            AnyMessage::Ebsy(_) => *b"EBSY",
            AnyMessage::Eunk(_) => *b"EUNK",
            AnyMessage::Eicv(_) => *b"EICV",
            AnyMessage::Lsyn(_) => *b"LSYN",
            AnyMessage::Secn(_) => *b"SECN",
            AnyMessage::Dclp(_) => *b"DCLP",
            AnyMessage::Ddrg(_) => *b"DDRG",
            AnyMessage::Dftr(_) => *b"DFTR",
            AnyMessage::Dsop(_) => *b"DSOP",
            AnyMessage::Unknown { code, .. } => *code,
        }
    }
}

type DecodeFn = fn(&[u8]) -> Result<AnyMessage, WireError>;

/// Maps a four-byte code to the decoder for its registered type.
pub struct Registry {
    decoders: HashMap<[u8; 4], DecodeFn>,
}

impl Registry {
    fn empty() -> Self {
        Self { decoders: HashMap::new() }
    }

    /// Registers `code -> decode`. Returns an error on a duplicate code;
    /// the default registry treats that as a fatal startup condition.
    fn register(&mut self, code: [u8; 4], decode: DecodeFn) -> Result<(), WireError> {
        if self.decoders.insert(code, decode).is_some() {
            return Err(WireError::SchemaViolation(format!(
                "duplicate registration for code {}",
                String::from_utf8_lossy(&code)
            )));
        }
        Ok(())
    }

    /// O(1) lookup of the decoder registered for `code`, if any.
    pub fn class_for(&self, code: [u8; 4]) -> Option<DecodeFn> {
        self.decoders.get(&code).copied()
    }

    /// Decodes `body` (the bytes after the 4-byte code) into an
    /// [`AnyMessage`], looking up `code` in this registry. Codes with no
    /// registered type decode to [`AnyMessage::Unknown`].
    pub fn decode(&self, code: [u8; 4], body: &[u8]) -> Result<AnyMessage, WireError> {
        match self.class_for(code) {
            Some(decode) => decode(body),
            None => Ok(AnyMessage::Unknown { code, body: body.to_vec() }),
        }
    }
}

macro_rules! register_all {
    ($reg:ident, $( $code:expr => $variant:ident : $ty:ty ),* $(,)?) => {
        $(
            $reg.register($code, |body| {
                let msg: $ty = unpack(body)?;
                Ok(AnyMessage::$variant(msg))
            }).expect("default registry codes are all distinct");
        )*
    };
}

fn build_default_registry() -> Registry {
    let mut reg = Registry::empty();
    register_all! { reg,
        *b"CALV" => Calv: CalvMsg,
        *b"CBYE" => Cbye: CbyeMsg,
        *b"CINN" => Cinn: CinnMsg,
        *b"COUT" => Cout: CoutMsg,
        *b"CIAK" => Ciak: CiakMsg,
        *b"CNOP" => Cnop: CnopMsg,
        *b"CROP" => Crop: CropMsg,
        *b"CSEC" => Csec: CsecMsg,
        *b"CCLP" => Cclp: CclpMsg,
        *b"DKDN" => Dkdn: DkdnMsg,
        *b"DKDL" => Dkdl: DkdlMsg,
        *b"DKRP" => Dkrp: DkrpMsg,
        *b"DKUP" => Dkup: DkupMsg,
        *b"DMDN" => Dmdn: DmdnMsg,
        *b"DMUP" => Dmup: DmupMsg,
        *b"DMMV" => Dmmv: DmmvMsg,
        *b"DMRM" => Dmrm: DmrmMsg,
        *b"DMWM" => Dmwm: DmwmMsg,
        *b"QINF" => Qinf: QinfMsg,
        *b"DINF" => Dinf: DinfMsg,
        *b"EBAD" => Ebad: EbadMsg,
        *b"EBSY" => Ebsy: EbsyMsg,
        *b"EUNK" => Eunk: EunkMsg,
        *b"EICV" => Eicv: EicvMsg,
        *b"LSYN" => Lsyn: LsynMsg,
        *b"SECN" => Secn: SecnMsg,
        *b"DCLP" => Dclp: DclpMsg,
        *b"DDRG" => Ddrg: DdrgMsg,
        *b"DFTR" => Dftr: DftrMsg,
        *b"DSOP" => Dsop: DsopMsg,
    };
    reg
}

/// The process-wide registry, built once on first use.
pub fn global() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(build_default_registry)
}

/// Packs an [`AnyMessage`] back into wire bytes (code + body, no length
/// prefix), for the handful of handlers that need to re-emit whatever they
/// received (e.g. `CALV` echo) without naming its concrete type.
pub fn pack_any(msg: &AnyMessage) -> Vec<u8> {
    fn pack_msg<T: crate::wire::messages::WireMessage>(m: &T) -> Vec<u8> {
        pack_fields(T::schema(), &m.to_values())
    }

    let code = msg.code();
    let mut out = Vec::new();
    out.extend_from_slice(&code);
    macro_rules! pack_variant {
        ($m:expr) => {
            out.extend(pack_msg($m))
        };
    }
    match msg {
        AnyMessage::Calv(m) => pack_variant!(m),
        AnyMessage::Cbye(m) => pack_variant!(m),
        AnyMessage::Cinn(m) => pack_variant!(m),
        AnyMessage::Cout(m) => pack_variant!(m),
        AnyMessage::Ciak(m) => pack_variant!(m),
        AnyMessage::Cnop(m) => pack_variant!(m),
        AnyMessage::Crop(m) => pack_variant!(m),
        AnyMessage::Csec(m) => pack_variant!(m),
        AnyMessage::Cclp(m) => pack_variant!(m),
        AnyMessage::Dkdn(m) => pack_variant!(m),
        AnyMessage::Dkdl(m) => pack_variant!(m),
        AnyMessage::Dkrp(m) => pack_variant!(m),
        AnyMessage::Dkup(m) => pack_variant!(m),
        AnyMessage::Dmdn(m) => pack_variant!(m),
        AnyMessage::Dmup(m) => pack_variant!(m),
        AnyMessage::Dmmv(m) => pack_variant!(m),
        AnyMessage::Dmrm(m) => pack_variant!(m),
        AnyMessage::Dmwm(m) => pack_variant!(m),
        AnyMessage::Qinf(m) => pack_variant!(m),
        AnyMessage::Dinf(m) => pack_variant!(m),
        AnyMessage::Ebad(m) => pack_variant!(m),
        AnyMessage::Ebsy(m) => pack_variant!(m),
        AnyMessage::Eunk(m) => pack_variant!(m),
        AnyMessage::Eicv(m) => pack_variant!(m),
        AnyMessage::Lsyn(m) => pack_variant!(m),
        AnyMessage::Secn(m) => pack_variant!(m),
        AnyMessage::Dclp(m) => pack_variant!(m),
        AnyMessage::Ddrg(m) => pack_variant!(m),
        AnyMessage::Dftr(m) => pack_variant!(m),
        AnyMessage::Dsop(m) => pack_variant!(m),
        AnyMessage::Unknown { body, .. } => out.extend_from_slice(body),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_for_known_code_resolves() {
        assert!(global().class_for(*b"CINN").is_some());
    }

    #[test]
    fn class_for_unknown_code_is_none() {
        assert!(global().class_for(*b"ZZZZ").is_none());
    }

    #[test]
    fn decode_unknown_code_carries_raw_body() {
        let msg = global().decode(*b"ZZZZ", &[1, 2, 3]).unwrap();
        match msg {
            AnyMessage::Unknown { code, body } => {
                assert_eq!(&code, b"ZZZZ");
                assert_eq!(body, vec![1, 2, 3]);
            }
            _ => panic!("expected Unknown"),
        }
    }
}

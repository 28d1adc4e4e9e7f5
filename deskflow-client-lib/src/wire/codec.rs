//! Declarative field schema and the generic pack/unpack engine that reads it.
//!
//! Each concrete message type (see [`crate::wire::messages`]) declares an
//! ordered [`FieldKind`] slice once, as a literal array — no runtime
//! reflection. The engine in this module turns that schema plus a slice of
//! [`Value`]s into wire bytes and back.

use crate::error::WireError;

/// Four-byte ASCII message code, always uppercase on the wire.
pub type MsgCode = [u8; 4];

/// Width of a `FIX_VAL` integer field, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    One,
    Two,
    Four,
}

impl IntWidth {
    fn bytes(self) -> usize {
        match self {
            IntWidth::One => 1,
            IntWidth::Two => 2,
            IntWidth::Four => 4,
        }
    }
}

/// Element type of a `VAR_LIST<T>` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListElem {
    /// A `VAR_STR` per element (file paths, language tags).
    Str,
    /// A `(VAR_STR, i32)` pair per element (option maps such as `DSOP`).
    KeyI32,
}

/// One instruction in a message's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FixValU(IntWidth),
    FixValI(IntWidth),
    FixStr(usize),
    VarStr,
    VarList(ListElem),
}

/// A decoded or to-be-encoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    Str(String),
    StrList(Vec<String>),
    KvList(Vec<(String, i32)>),
}

macro_rules! value_conv {
    ($variant:ident, $ty:ty, $getter:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }

        impl Value {
            pub fn $getter(&self) -> Result<$ty, WireError> {
                match self {
                    Value::$variant(v) => Ok(*v),
                    _ => Err(WireError::SchemaViolation(format!(
                        "expected {} value",
                        stringify!($variant)
                    ))),
                }
            }
        }
    };
}

value_conv!(U8, u8, u8);
value_conv!(I8, i8, i8);
value_conv!(U16, u16, u16);
value_conv!(I16, i16, i16);
value_conv!(U32, u32, u32);
value_conv!(I32, i32, i32);

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl Value {
    pub fn str(&self) -> Result<String, WireError> {
        match self {
            Value::Str(v) => Ok(v.clone()),
            _ => Err(WireError::SchemaViolation("expected Str value".into())),
        }
    }

    pub fn str_list(&self) -> Result<Vec<String>, WireError> {
        match self {
            Value::StrList(v) => Ok(v.clone()),
            _ => Err(WireError::SchemaViolation("expected StrList value".into())),
        }
    }

    pub fn kv_list(&self) -> Result<Vec<(String, i32)>, WireError> {
        match self {
            Value::KvList(v) => Ok(v.clone()),
            _ => Err(WireError::SchemaViolation("expected KvList value".into())),
        }
    }
}

/// Converts a concrete Rust field type to and from the generic [`Value`]
/// carried through [`pack_fields`]/[`unpack_fields`]. Implemented for every
/// primitive type a message schema can declare; the `define_message!` macro
/// in [`crate::wire::messages`] calls it once per field.
pub trait FieldValue: Sized {
    fn to_value(&self) -> Value;
    fn from_value(v: Value) -> Result<Self, WireError>;
}

macro_rules! field_value_int {
    ($ty:ty, $getter:ident) => {
        impl FieldValue for $ty {
            fn to_value(&self) -> Value {
                Value::from(*self)
            }
            fn from_value(v: Value) -> Result<Self, WireError> {
                v.$getter()
            }
        }
    };
}

field_value_int!(u8, u8);
field_value_int!(i8, i8);
field_value_int!(u16, u16);
field_value_int!(i16, i16);
field_value_int!(u32, u32);
field_value_int!(i32, i32);

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::U8(u8::from(*self))
    }
    fn from_value(v: Value) -> Result<Self, WireError> {
        Ok(v.u8()? != 0)
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
    fn from_value(v: Value) -> Result<Self, WireError> {
        v.str()
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StrList(v)
    }
}

impl FieldValue for Vec<String> {
    fn to_value(&self) -> Value {
        Value::StrList(self.clone())
    }
    fn from_value(v: Value) -> Result<Self, WireError> {
        v.str_list()
    }
}

impl From<Vec<(String, i32)>> for Value {
    fn from(v: Vec<(String, i32)>) -> Self {
        Value::KvList(v)
    }
}

impl FieldValue for Vec<(String, i32)> {
    fn to_value(&self) -> Value {
        Value::KvList(self.clone())
    }
    fn from_value(v: Value) -> Result<Self, WireError> {
        v.kv_list()
    }
}

/// Packs `values` according to `schema`, in order. Does not include the
/// message code prefix — callers prepend it (see [`crate::wire::pack`]).
pub fn pack_fields(schema: &[FieldKind], values: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    for (kind, value) in schema.iter().zip(values.iter()) {
        pack_one(&mut out, kind, value);
    }
    out
}

fn pack_one(out: &mut Vec<u8>, kind: &FieldKind, value: &Value) {
    match kind {
        FieldKind::FixValU(width) => {
            let v = match value {
                Value::U8(v) => *v as u32,
                Value::U16(v) => *v as u32,
                Value::U32(v) => *v,
                _ => 0,
            };
            push_be(out, v, width.bytes());
        }
        FieldKind::FixValI(width) => {
            let v = match value {
                Value::I8(v) => *v as i32,
                Value::I16(v) => *v as i32,
                Value::I32(v) => *v,
                _ => 0,
            };
            push_be(out, v as u32, width.bytes());
        }
        FieldKind::FixStr(width) => {
            let s = match value {
                Value::Str(s) => s.as_str(),
                _ => "",
            };
            let bytes = s.as_bytes();
            let take = bytes.len().min(*width);
            out.extend_from_slice(&bytes[..take]);
            out.resize(out.len() + (*width - take), 0);
        }
        FieldKind::VarStr => {
            let s = match value {
                Value::Str(s) => s.as_str(),
                _ => "",
            };
            let bytes = s.as_bytes();
            out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        FieldKind::VarList(elem) => match elem {
            ListElem::Str => {
                let items = match value {
                    Value::StrList(v) => v.as_slice(),
                    _ => &[],
                };
                out.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for item in items {
                    let bytes = item.as_bytes();
                    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                    out.extend_from_slice(bytes);
                }
            }
            ListElem::KeyI32 => {
                let items = match value {
                    Value::KvList(v) => v.as_slice(),
                    _ => &[],
                };
                out.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for (key, val) in items {
                    let bytes = key.as_bytes();
                    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                    out.extend_from_slice(bytes);
                    out.extend_from_slice(&val.to_be_bytes());
                }
            }
        },
    }
}

fn push_be(out: &mut Vec<u8>, v: u32, width: usize) {
    let full = v.to_be_bytes();
    out.extend_from_slice(&full[4 - width..]);
}

/// Unpacks `body` according to `schema`, producing one [`Value`] per
/// instruction in order. Errors with [`WireError::ShortBody`] on truncation
/// and [`WireError::BadEncoding`] on invalid UTF-8 in string fields.
pub fn unpack_fields(schema: &[FieldKind], body: &[u8]) -> Result<Vec<Value>, WireError> {
    let mut offset = 0usize;
    let mut out = Vec::with_capacity(schema.len());
    for kind in schema {
        out.push(unpack_one(kind, body, &mut offset)?);
    }
    Ok(out)
}

fn need(body: &[u8], offset: usize, len: usize) -> Result<(), WireError> {
    if body.len() < offset + len {
        Err(WireError::ShortBody)
    } else {
        Ok(())
    }
}

fn unpack_one(kind: &FieldKind, body: &[u8], offset: &mut usize) -> Result<Value, WireError> {
    match kind {
        FieldKind::FixValU(width) => {
            let w = width.bytes();
            need(body, *offset, w)?;
            let v = read_be(&body[*offset..*offset + w]);
            *offset += w;
            Ok(match width {
                IntWidth::One => Value::U8(v as u8),
                IntWidth::Two => Value::U16(v as u16),
                IntWidth::Four => Value::U32(v),
            })
        }
        FieldKind::FixValI(width) => {
            let w = width.bytes();
            need(body, *offset, w)?;
            let v = read_be(&body[*offset..*offset + w]);
            *offset += w;
            Ok(match width {
                IntWidth::One => Value::I8(v as u8 as i8),
                IntWidth::Two => Value::I16(v as u16 as i16),
                IntWidth::Four => Value::I32(v as i32),
            })
        }
        FieldKind::FixStr(width) => {
            need(body, *offset, *width)?;
            let raw = &body[*offset..*offset + width];
            *offset += width;
            let s = std::str::from_utf8(raw)
                .map_err(|_| WireError::BadEncoding { field: "fix_str" })?;
            Ok(Value::Str(s.trim_end_matches('\0').to_string()))
        }
        FieldKind::VarStr => {
            let (s, consumed) = read_var_str(body, *offset)?;
            *offset += consumed;
            Ok(Value::Str(s))
        }
        FieldKind::VarList(elem) => match elem {
            ListElem::Str => {
                need(body, *offset, 4)?;
                let count = read_be(&body[*offset..*offset + 4]) as usize;
                *offset += 4;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let (s, consumed) = read_var_str(body, *offset)?;
                    *offset += consumed;
                    items.push(s);
                }
                Ok(Value::StrList(items))
            }
            ListElem::KeyI32 => {
                need(body, *offset, 4)?;
                let count = read_be(&body[*offset..*offset + 4]) as usize;
                *offset += 4;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let (key, consumed) = read_var_str(body, *offset)?;
                    *offset += consumed;
                    need(body, *offset, 4)?;
                    let val = read_be(&body[*offset..*offset + 4]) as i32;
                    *offset += 4;
                    items.push((key, val));
                }
                Ok(Value::KvList(items))
            }
        },
    }
}

fn read_var_str(body: &[u8], offset: usize) -> Result<(String, usize), WireError> {
    need(body, offset, 4)?;
    let len = read_be(&body[offset..offset + 4]) as usize;
    need(body, offset + 4, len)?;
    let raw = &body[offset + 4..offset + 4 + len];
    let s = std::str::from_utf8(raw).map_err(|_| WireError::BadEncoding { field: "var_str" })?;
    Ok((s.to_string(), 4 + len))
}

fn read_be(bytes: &[u8]) -> u32 {
    let mut v: u32 = 0;
    for b in bytes {
        v = (v << 8) | (*b as u32);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_str_pads_and_truncates() {
        let schema = [FieldKind::FixStr(7)];
        let packed = pack_fields(&schema, &[Value::Str("Synergy".into())]);
        assert_eq!(packed, b"Synergy");

        let packed = pack_fields(&schema, &[Value::Str("Syn".into())]);
        assert_eq!(packed, b"Syn\0\0\0\0");
    }

    #[test]
    fn var_str_empty_packs_to_zero_length() {
        let schema = [FieldKind::VarStr];
        let packed = pack_fields(&schema, &[Value::Str(String::new())]);
        assert_eq!(packed, [0u8, 0, 0, 0]);
    }

    #[test]
    fn round_trip_mixed_schema() {
        let schema = [
            FieldKind::FixValI(IntWidth::Two),
            FieldKind::FixValI(IntWidth::Two),
            FieldKind::FixValU(IntWidth::Four),
            FieldKind::FixValU(IntWidth::Two),
        ];
        let values = vec![
            Value::I16(100),
            Value::I16(200),
            Value::U32(1),
            Value::U16(0),
        ];
        let packed = pack_fields(&schema, &values);
        let unpacked = unpack_fields(&schema, &packed).unwrap();
        assert_eq!(unpacked, values);
    }

    #[test]
    fn short_body_is_an_error() {
        let schema = [FieldKind::FixValU(IntWidth::Four)];
        let err = unpack_fields(&schema, &[0, 1]).unwrap_err();
        assert_eq!(err, WireError::ShortBody);
    }

    #[test]
    fn bad_utf8_in_fix_str_is_an_error() {
        let schema = [FieldKind::FixStr(2)];
        let err = unpack_fields(&schema, &[0xff, 0xfe]).unwrap_err();
        assert_eq!(err, WireError::BadEncoding { field: "fix_str" });
    }
}

//! The bit-exact replication wire format (spec section 6).
//!
//! Grounded in `original_source/src/LindaRT/src/serialize/tuple.cxx`: a
//! leading type-tag byte (the same `typemap` enum [`crate::value::ValueTag`]
//! already mirrors: `LRT_INT16=0 .. LRT_REFTYPE=11`), then a payload whose
//! width is fixed by the tag. The original only byte-swaps on a big-endian
//! host (`swap_unless_comm_endian`, since its "communication endian" is
//! little-endian); this crate always encodes/decodes little-endian
//! directly via `to_le_bytes`/`from_le_bytes`; no swap step is needed
//! because Rust gives us the endian-explicit conversion for free.

use crate::error::{Error, Result};
use crate::tuple::Tuple;
use crate::value::{FnCallHolder, Value, ValueTag};

/// The only wire format version this crate speaks. Carried on every
/// encoded tuple so a future format revision can be detected rather than
/// silently misparsed.
const WIRE_VERSION: u8 = 1;

fn tag_byte(tag: ValueTag) -> u8 {
    tag as u8
}

fn tag_from_byte(byte: u8) -> Result<ValueTag> {
    Ok(match byte {
        0 => ValueTag::Int16,
        1 => ValueTag::Int32,
        2 => ValueTag::Int64,
        3 => ValueTag::UInt16,
        4 => ValueTag::UInt32,
        5 => ValueTag::UInt64,
        6 => ValueTag::Str,
        7 => ValueTag::Float32,
        8 => ValueTag::Float64,
        9 => ValueTag::FnCall,
        10 => ValueTag::CallTag,
        11 => ValueTag::TypeRef,
        other => return Err(Error::InvalidWire(format!("unknown type tag byte {other}"))),
    })
}

/// Encodes `value` onto the end of `out`, little-endian, per spec section 6.
pub fn encode_value(value: &Value, out: &mut Vec<u8>) {
    out.push(tag_byte(value.tag()));
    match value {
        Value::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Str(s) => encode_str(s, out),
        Value::Float32(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
        Value::Float64(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
        Value::FnCall(holder) => {
            encode_tuple(holder.args(), out);
            encode_str(holder.fn_name(), out);
        }
        Value::CallTag => {}
        Value::TypeRef(t) => out.push(tag_byte(*t)),
    }
}

fn encode_str(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(s.len() as u64).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// Encodes `tuple` onto the end of `out`: a version byte, an arity prefix,
/// then each position's value in order.
pub fn encode_tuple(tuple: &Tuple, out: &mut Vec<u8>) {
    out.push(WIRE_VERSION);
    out.extend_from_slice(&(tuple.len() as u64).to_le_bytes());
    for value in tuple.iter() {
        encode_value(value, out);
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(Error::InvalidWire(format!(
                "truncated input: need {n} bytes at offset {}, have {}",
                self.pos,
                self.bytes.len() - self.pos
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u64()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::InvalidWire(format!("invalid UTF-8 in string payload: {e}")))
    }
}

fn decode_value_at(cursor: &mut Cursor<'_>) -> Result<Value> {
    let tag = tag_from_byte(cursor.u8()?)?;
    Ok(match tag {
        ValueTag::Int16 => Value::Int16(cursor.i16()?),
        ValueTag::Int32 => Value::Int32(cursor.i32()?),
        ValueTag::Int64 => Value::Int64(cursor.i64()?),
        ValueTag::UInt16 => Value::UInt16(cursor.u16()?),
        ValueTag::UInt32 => Value::UInt32(cursor.u32()?),
        ValueTag::UInt64 => Value::UInt64(cursor.u64()?),
        ValueTag::Str => Value::Str(cursor.string()?),
        ValueTag::Float32 => Value::Float32(f32::from_bits(cursor.u32()?)),
        ValueTag::Float64 => Value::Float64(f64::from_bits(cursor.u64()?)),
        ValueTag::FnCall => {
            let args = decode_tuple_at(cursor)?;
            let fn_name = cursor.string()?;
            Value::FnCall(Box::new(FnCallHolder::new(fn_name, args)))
        }
        ValueTag::CallTag => Value::CallTag,
        ValueTag::TypeRef => Value::TypeRef(tag_from_byte(cursor.u8()?)?),
    })
}

fn decode_tuple_at(cursor: &mut Cursor<'_>) -> Result<Tuple> {
    let version = cursor.u8()?;
    if version != WIRE_VERSION {
        return Err(Error::InvalidWire(format!(
            "unsupported wire version {version}, expected {WIRE_VERSION}"
        )));
    }
    let arity = cursor.u64()? as usize;
    let mut values = Vec::with_capacity(arity.min(1024));
    for _ in 0..arity {
        values.push(decode_value_at(cursor)?);
    }
    Tuple::from_values(values)
}

/// Decodes a single [`Value`] from the start of `bytes`.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor { bytes, pos: 0 };
    decode_value_at(&mut cursor)
}

/// Decodes a single [`Tuple`] from the start of `bytes`.
pub fn decode_tuple(bytes: &[u8]) -> Result<Tuple> {
    let mut cursor = Cursor { bytes, pos: 0 };
    decode_tuple_at(&mut cursor)
}

//! The record format's serial-type tags and the closed `Value` sum they
//! decode into.
//!
//! Grounded on the teacher's `sql_data_types.rs`, which kept a separate
//! `SerialData` variant per integer sub-width (`I8`, `I16`, `I24`, ...),
//! forcing every consumer to match on all of them. Integer sub-widths are
//! unified here into a single `Value::Int(i64)`, and the boolean-ish
//! constant serial types (8 and 9) decode to `Value::Bool`.

use crate::error::{EngineError, Result};
use crate::varint::{read_uint_be, VarInt};

/// A per-column tag in a record header, encoding both the column's type and
/// its on-disk byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialType {
    Null,
    Int(usize), // body width in bytes: 1, 2, 3, 4, 6 or 8
    Float64,
    Zero,
    One,
    Reserved,
    Blob(usize),
    Text(usize),
}

impl SerialType {
    pub fn from_code(code: i64) -> Result<Self> {
        let serial_type = match code {
            0 => SerialType::Null,
            1 => SerialType::Int(1),
            2 => SerialType::Int(2),
            3 => SerialType::Int(3),
            4 => SerialType::Int(4),
            5 => SerialType::Int(6),
            6 => SerialType::Int(8),
            7 => SerialType::Float64,
            8 => SerialType::Zero,
            9 => SerialType::One,
            10 | 11 => SerialType::Reserved,
            n if n >= 12 && n % 2 == 0 => SerialType::Blob(((n - 12) / 2) as usize),
            n if n >= 13 && n % 2 == 1 => SerialType::Text(((n - 13) / 2) as usize),
            n => {
                return Err(EngineError::malformed(
                    "record header",
                    format!("negative or otherwise invalid serial type {n}"),
                ))
            }
        };
        Ok(serial_type)
    }

    /// The number of bytes this serial type's value occupies in the
    /// record's body.
    pub fn body_width(&self) -> usize {
        match self {
            SerialType::Null | SerialType::Zero | SerialType::One => 0,
            SerialType::Int(w) => *w,
            SerialType::Float64 => 8,
            SerialType::Reserved => 0,
            SerialType::Blob(n) | SerialType::Text(n) => *n,
        }
    }
}

/// A decoded column value. Closed sum so every consumer matches
/// exhaustively instead of asserting a reflected type at each use site.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Int(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }

    /// Numeric value for integer/boolean columns, used by WHERE equality
    /// comparisons against numeric literals.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }
}

fn decode_body(serial_type: SerialType, body: &[u8]) -> Result<(Value, usize)> {
    let width = serial_type.body_width();
    if body.len() < width {
        return Err(EngineError::malformed(
            "record body",
            format!("need {width} bytes for {serial_type:?}, have {}", body.len()),
        ));
    }

    let value = match serial_type {
        SerialType::Null => Value::Null,
        SerialType::Int(w) => {
            // Sign-extend: read as unsigned then shift into the top of an
            // i64 so the native twos-complement sign is preserved.
            let unsigned = read_uint_be(body, w)?;
            let shift = (8 - w) * 8;
            let signed = ((unsigned << shift) as i64) >> shift;
            Value::Int(signed)
        }
        SerialType::Float64 => {
            return Err(EngineError::unsupported("floating point columns"))
        }
        SerialType::Zero => Value::Bool(false),
        SerialType::One => Value::Bool(true),
        SerialType::Reserved => {
            return Err(EngineError::unsupported("reserved serial type"))
        }
        SerialType::Blob(n) => Value::Blob(body[..n].to_vec()),
        SerialType::Text(n) => {
            let text = String::from_utf8(body[..n].to_vec()).map_err(|_| {
                EngineError::malformed("record body", "text column is not valid utf-8")
            })?;
            Value::Text(text)
        }
    };

    Ok((value, width))
}

/// Decodes a record payload: a varint header length, a run of serial-type
/// varints, then the column bodies in order.
pub fn decode_record(payload: &[u8]) -> Result<Vec<Value>> {
    let header_len_varint = VarInt::read(payload)?;
    let header_len = header_len_varint.0 as usize;
    let mut header_offset = header_len_varint.1 as usize;

    let mut serial_types = Vec::new();
    while header_offset < header_len {
        let varint = VarInt::read(&payload[header_offset..])?;
        header_offset += varint.1 as usize;
        serial_types.push(SerialType::from_code(varint.0)?);
    }

    if header_offset != header_len {
        return Err(EngineError::malformed(
            "record header",
            format!("header varints overran declared header length {header_len}"),
        ));
    }

    let mut body_offset = header_len;
    let mut values = Vec::with_capacity(serial_types.len());
    for serial_type in serial_types {
        let (value, consumed) = decode_body(serial_type, &payload[body_offset..])?;
        body_offset += consumed;
        values.push(value);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint_bytes(mut v: i64) -> Vec<u8> {
        crate::varint::encode_varint(v as u64)
    }

    #[test]
    fn decodes_null_and_text() {
        // header_len varint, serial type NULL (0), serial type TEXT len 5 (13+2*5=23)
        let mut payload = Vec::new();
        let mut header = Vec::new();
        header.extend(varint_bytes(0));
        header.extend(varint_bytes(23));
        let header_len = 1 + header.len() as i64; // +1 for the header_len varint itself (single byte here)
        payload.extend(varint_bytes(header_len));
        payload.extend(&header);
        payload.extend(b"hello");

        let values = decode_record(&payload).unwrap();
        assert_eq!(values, vec![Value::Null, Value::Text("hello".into())]);
    }

    #[test]
    fn decodes_negative_int8() {
        let mut payload = Vec::new();
        let header_len = 1 + 1; // header len varint (1 byte) + one serial type varint (1 byte)
        payload.extend(varint_bytes(header_len));
        payload.extend(varint_bytes(1)); // serial type 1 = int8
        payload.push(0xFFu8); // -1 in two's complement

        let values = decode_record(&payload).unwrap();
        assert_eq!(values, vec![Value::Int(-1)]);
    }

    #[test]
    fn decodes_bool_constants() {
        let mut payload = Vec::new();
        payload.extend(varint_bytes(3));
        payload.extend(varint_bytes(8));
        payload.extend(varint_bytes(9));

        let values = decode_record(&payload).unwrap();
        assert_eq!(values, vec![Value::Bool(false), Value::Bool(true)]);
    }

    #[test]
    fn float_is_unsupported() {
        let mut payload = Vec::new();
        payload.extend(varint_bytes(2));
        payload.extend(varint_bytes(7));
        payload.extend(&[0u8; 8]);

        assert!(decode_record(&payload).is_err());
    }
}

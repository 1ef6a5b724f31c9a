use std::fmt;

use crate::error::{DbError, DbResult};

/// The closed set of on-disk field types: `INT` is 4 big-endian bytes;
/// `STRING(len)` is a 4-byte big-endian length prefix followed by `len`
/// bytes, zero-padded past the meaningful prefix.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FieldType {
    Int,
    Str(usize),
}

impl FieldType {
    /// Fixed on-disk width of one value of this type.
    pub fn byte_len(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::Str(len) => 4 + len,
        }
    }

    pub fn encode(&self, field: &Field) -> DbResult<Vec<u8>> {
        match (self, field) {
            (FieldType::Int, Field::Int(v)) => Ok(v.to_be_bytes().to_vec()),
            (FieldType::Str(max_len), Field::Str(s)) => {
                let bytes = s.as_bytes();
                if bytes.len() > *max_len {
                    return Err(DbError::illegal_argument(format!(
                        "string of {} bytes exceeds field width {}",
                        bytes.len(),
                        max_len
                    )));
                }
                let mut out = Vec::with_capacity(self.byte_len());
                out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                out.extend_from_slice(bytes);
                out.resize(self.byte_len(), 0);
                Ok(out)
            }
            _ => Err(DbError::illegal_argument(
                "field value does not match field type",
            )),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Field {
        match self {
            FieldType::Int => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&bytes[0..4]);
                Field::Int(i32::from_be_bytes(buf))
            }
            FieldType::Str(max_len) => {
                let mut len_buf = [0u8; 4];
                len_buf.copy_from_slice(&bytes[0..4]);
                let len = (u32::from_be_bytes(len_buf) as usize).min(*max_len);
                let s = String::from_utf8_lossy(&bytes[4..4 + len]).into_owned();
                Field::Str(s)
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "INT"),
            FieldType::Str(len) => write!(f, "STRING({})", len),
        }
    }
}

/// One field's value within a tuple.
#[derive(Clone, PartialEq, Debug)]
pub enum Field {
    Int(i32),
    Str(String),
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Int(_) => FieldType::Int,
            Field::Str(s) => FieldType::Str(s.len()),
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Field::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Key used by aggregators/histograms when grouping or bucketing by
    /// this field's stringified value.
    pub fn group_key(&self) -> String {
        match self {
            Field::Int(v) => v.to_string(),
            Field::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One (field-type, optional-name) entry of a `TupleDesc`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FieldItem {
    pub field_type: FieldType,
    pub field_name: Option<String>,
}

impl FieldItem {
    pub fn new(field_type: FieldType, field_name: Option<String>) -> FieldItem {
        FieldItem {
            field_type,
            field_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_round_trip() {
        let t = FieldType::Int;
        let f = Field::Int(-42);
        let bytes = t.encode(&f).unwrap();
        assert_eq!(bytes.len(), 4);
        assert_eq!(t.decode(&bytes), f);
    }

    #[test]
    fn test_string_round_trip_and_padding() {
        let t = FieldType::Str(8);
        let f = Field::Str("hi".to_string());
        let bytes = t.encode(&f).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..4], &2u32.to_be_bytes());
        assert_eq!(t.decode(&bytes), f);
    }

    #[test]
    fn test_string_too_long_is_rejected() {
        let t = FieldType::Str(2);
        let f = Field::Str("too long".to_string());
        assert!(t.encode(&f).is_err());
    }
}

//! Minimal reader and writer for the `encoding/gob` stream that gorilla
//! sessions use for their value map (`map[interface{}]interface{}`).
//!
//! Only what a session payload contains is supported: map type
//! definitions and the predeclared scalar types (bool, int, uint, float,
//! byte slice, string), either directly or boxed in an interface. Anything
//! else is reported as an error so the caller can fall back to the legacy
//! scanner.

use std::collections::HashMap;

use super::value::SessionValue;

// Predeclared gob type ids
const TYPE_BOOL: i64 = 1;
const TYPE_INT: i64 = 2;
const TYPE_UINT: i64 = 3;
const TYPE_FLOAT: i64 = 4;
const TYPE_BYTES: i64 = 5;
const TYPE_STRING: i64 = 6;
const TYPE_INTERFACE: i64 = 8;

/// First id handed out to user types by an encoder.
const FIRST_USER_TYPE_ID: i64 = 65;

/// Field delta selecting `MapT` inside a `wireType` struct.
const WIRE_TYPE_MAP_DELTA: u64 = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GobError {
    #[error("unexpected end of gob data")]
    UnexpectedEof,

    #[error("gob integer overflow")]
    Overflow,

    #[error("unsupported gob type id {0}")]
    UnsupportedType(i64),

    #[error("value of undefined gob type id {0}")]
    UnknownType(i64),

    #[error("corrupted gob data: {0}")]
    Corrupted(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct MapType {
    key: i64,
    elem: i64,
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], GobError> {
        if n > self.remaining() {
            return Err(GobError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_byte(&mut self) -> Result<u8, GobError> {
        Ok(self.take(1)?[0])
    }

    /// Values below 128 are a single byte; larger ones are prefixed by the
    /// negated byte count followed by the big-endian bytes.
    fn read_uint(&mut self) -> Result<u64, GobError> {
        let first = self.read_byte()?;
        if first < 0x80 {
            return Ok(first as u64);
        }
        let count = first.wrapping_neg() as usize;
        if count > 8 {
            return Err(GobError::Overflow);
        }
        Ok(self
            .take(count)?
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }

    fn read_int(&mut self) -> Result<i64, GobError> {
        let u = self.read_uint()?;
        let i = (u >> 1) as i64;
        Ok(if u & 1 == 1 { !i } else { i })
    }

    fn read_len(&mut self) -> Result<usize, GobError> {
        let n = self.read_uint()?;
        let n = usize::try_from(n).map_err(|_| GobError::Overflow)?;
        if n > self.remaining() {
            return Err(GobError::UnexpectedEof);
        }
        Ok(n)
    }

    fn read_bytes(&mut self) -> Result<&'a [u8], GobError> {
        let n = self.read_len()?;
        self.take(n)
    }
}

/// Decodes the first map value in a gob stream, returning its entries in
/// wire order. Entries with a nil key or value are dropped.
pub fn decode_map(data: &[u8]) -> Result<Vec<(SessionValue, SessionValue)>, GobError> {
    let mut stream = Reader::new(data);
    let mut types: HashMap<i64, MapType> = HashMap::new();

    loop {
        if stream.remaining() == 0 {
            return Err(GobError::UnexpectedEof);
        }
        let len = stream.read_len()?;
        let mut message = Reader::new(stream.take(len)?);
        let type_id = message.read_int()?;

        if type_id < 0 {
            let map_type = read_wire_type(&mut message)?;
            types.insert(-type_id, map_type);
            continue;
        }

        let map_type = *types.get(&type_id).ok_or(GobError::UnknownType(type_id))?;
        if message.read_uint()? != 0 {
            return Err(GobError::Corrupted("non-zero delta for singleton"));
        }
        return read_map(&mut message, map_type);
    }
}

fn read_wire_type(message: &mut Reader<'_>) -> Result<MapType, GobError> {
    if message.read_uint()? != WIRE_TYPE_MAP_DELTA {
        return Err(GobError::Corrupted("only map type definitions are supported"));
    }
    let map_type = read_map_type(message)?;
    if message.read_uint()? != 0 {
        return Err(GobError::Corrupted("trailing fields in wire type"));
    }
    Ok(map_type)
}

fn read_map_type(message: &mut Reader<'_>) -> Result<MapType, GobError> {
    let mut field: i64 = -1;
    let mut key = None;
    let mut elem = None;

    loop {
        let delta = message.read_uint()?;
        if delta == 0 {
            break;
        }
        field = next_field(field, delta)?;
        match field {
            0 => skip_common_type(message)?,
            1 => key = Some(message.read_int()?),
            2 => elem = Some(message.read_int()?),
            _ => return Err(GobError::Corrupted("unknown map type field")),
        }
    }

    match (key, elem) {
        (Some(key), Some(elem)) => Ok(MapType { key, elem }),
        _ => Err(GobError::Corrupted("map type without key or element")),
    }
}

/// Applies a struct field delta; deltas come off the wire unchecked.
fn next_field(field: i64, delta: u64) -> Result<i64, GobError> {
    i64::try_from(delta)
        .ok()
        .and_then(|delta| field.checked_add(delta))
        .ok_or(GobError::Corrupted("field delta out of range"))
}

// CommonType { Name string; Id typeId }
fn skip_common_type(message: &mut Reader<'_>) -> Result<(), GobError> {
    let mut field: i64 = -1;
    loop {
        let delta = message.read_uint()?;
        if delta == 0 {
            return Ok(());
        }
        field = next_field(field, delta)?;
        match field {
            0 => {
                message.read_bytes()?;
            }
            1 => {
                message.read_int()?;
            }
            _ => return Err(GobError::Corrupted("unknown common type field")),
        }
    }
}

fn read_map(
    message: &mut Reader<'_>,
    map_type: MapType,
) -> Result<Vec<(SessionValue, SessionValue)>, GobError> {
    let count = message.read_uint()?;
    let count = usize::try_from(count).map_err(|_| GobError::Overflow)?;
    if count > message.remaining() {
        return Err(GobError::Corrupted("map length exceeds message"));
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let key = read_typed(message, map_type.key)?;
        let elem = read_typed(message, map_type.elem)?;
        if let (Some(key), Some(elem)) = (key, elem) {
            entries.push((key, elem));
        }
    }
    Ok(entries)
}

fn read_typed(message: &mut Reader<'_>, type_id: i64) -> Result<Option<SessionValue>, GobError> {
    if type_id == TYPE_INTERFACE {
        read_interface(message)
    } else {
        read_scalar(message, type_id).map(Some)
    }
}

fn read_interface(message: &mut Reader<'_>) -> Result<Option<SessionValue>, GobError> {
    let name = message.read_bytes()?;
    if name.is_empty() {
        return Ok(None);
    }

    let type_id = message.read_int()?;
    let data = message.read_bytes()?;
    let mut inner = Reader::new(data);
    if inner.read_uint()? != 0 {
        return Err(GobError::Corrupted("non-zero delta for interface value"));
    }
    read_scalar(&mut inner, type_id).map(Some)
}

fn read_scalar(reader: &mut Reader<'_>, type_id: i64) -> Result<SessionValue, GobError> {
    match type_id {
        TYPE_BOOL => Ok(SessionValue::Bool(reader.read_uint()? != 0)),
        TYPE_INT => Ok(SessionValue::Int(reader.read_int()?)),
        TYPE_UINT => Ok(SessionValue::Uint(reader.read_uint()?)),
        TYPE_FLOAT => Ok(SessionValue::Float(f64::from_bits(
            reader.read_uint()?.swap_bytes(),
        ))),
        TYPE_BYTES => Ok(SessionValue::Bytes(reader.read_bytes()?.to_vec())),
        TYPE_STRING => Ok(SessionValue::Str(
            String::from_utf8_lossy(reader.read_bytes()?).into_owned(),
        )),
        other => Err(GobError::UnsupportedType(other)),
    }
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn uint(&mut self, value: u64) {
        if value < 0x80 {
            self.buf.push(value as u8);
            return;
        }
        let bytes = value.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        let significant = &bytes[skip..];
        self.buf.push((significant.len() as u8).wrapping_neg());
        self.buf.extend_from_slice(significant);
    }

    fn int(&mut self, value: i64) {
        let zigzag = if value < 0 {
            ((!value as u64) << 1) | 1
        } else {
            (value as u64) << 1
        };
        self.uint(zigzag);
    }

    fn bytes(&mut self, value: &[u8]) {
        self.uint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    fn scalar(&mut self, value: &SessionValue) {
        match value {
            SessionValue::Bool(v) => self.uint(u64::from(*v)),
            SessionValue::Int(v) => self.int(*v),
            SessionValue::Uint(v) => self.uint(*v),
            SessionValue::Float(v) => self.uint(v.to_bits().swap_bytes()),
            SessionValue::Bytes(v) => self.bytes(v),
            SessionValue::Str(v) => self.bytes(v.as_bytes()),
        }
    }

    fn interface(&mut self, value: &SessionValue) {
        let (name, type_id) = match value {
            SessionValue::Bool(_) => ("bool", TYPE_BOOL),
            SessionValue::Int(_) => ("int", TYPE_INT),
            SessionValue::Uint(_) => ("uint", TYPE_UINT),
            SessionValue::Float(_) => ("float64", TYPE_FLOAT),
            SessionValue::Bytes(_) => ("[]uint8", TYPE_BYTES),
            SessionValue::Str(_) => ("string", TYPE_STRING),
        };
        self.bytes(name.as_bytes());
        self.int(type_id);

        let mut data = Writer::default();
        data.uint(0);
        data.scalar(value);
        self.bytes(&data.buf);
    }

    fn message(&mut self, body: Writer) {
        self.bytes(&body.buf);
    }
}

/// Encodes entries as a `map[interface{}]interface{}` gob stream, the way
/// a gorilla session store serializes its values.
pub fn encode_map(entries: &[(&str, SessionValue)]) -> Vec<u8> {
    let mut definition = Writer::default();
    definition.int(-FIRST_USER_TYPE_ID);
    definition.uint(WIRE_TYPE_MAP_DELTA);
    // mapType.CommonType { Id }
    definition.uint(1);
    definition.uint(2);
    definition.int(FIRST_USER_TYPE_ID);
    definition.uint(0);
    // mapType.Key, mapType.Elem
    definition.uint(1);
    definition.int(TYPE_INTERFACE);
    definition.uint(1);
    definition.int(TYPE_INTERFACE);
    definition.uint(0);
    definition.uint(0);

    let mut value = Writer::default();
    value.int(FIRST_USER_TYPE_ID);
    value.uint(0);
    value.uint(entries.len() as u64);
    for (key, elem) in entries {
        value.interface(&SessionValue::Str((*key).to_string()));
        value.interface(elem);
    }

    let mut stream = Writer::default();
    stream.message(definition);
    stream.message(value);
    stream.buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_definition_matches_go_encoder() {
        let encoded = encode_map(&[]);
        let expected_prefix = [
            0x0e, 0xff, 0x81, 0x04, 0x01, 0x02, 0xff, 0x82, 0x00, 0x01, 0x10, 0x01, 0x10, 0x00,
            0x00,
        ];
        assert_eq!(&encoded[..expected_prefix.len()], &expected_prefix);
        // value message: length, type id 65, singleton delta, zero entries
        assert_eq!(&encoded[expected_prefix.len()..], &[0x04, 0xff, 0x82, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_mixed_values() {
        let encoded = encode_map(&[
            ("id", SessionValue::Int(1234)),
            ("username", SessionValue::Str("alice".into())),
            ("ratio", SessionValue::Float(0.5)),
            ("admin", SessionValue::Bool(true)),
            ("quota", SessionValue::Uint(300)),
            ("negative", SessionValue::Int(-77)),
        ]);

        let entries = decode_map(&encoded).unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0], (SessionValue::from("id"), SessionValue::Int(1234)));
        assert_eq!(entries[1].1, SessionValue::Str("alice".into()));
        assert_eq!(entries[2].1, SessionValue::Float(0.5));
        assert_eq!(entries[3].1, SessionValue::Bool(true));
        assert_eq!(entries[4].1, SessionValue::Uint(300));
        assert_eq!(entries[5].1, SessionValue::Int(-77));
    }

    #[test]
    fn test_nil_interface_entries_are_dropped() {
        // map with one entry whose value is a nil interface
        let mut encoded = encode_map(&[]);
        encoded.truncate(15);
        encoded.extend_from_slice(&[
            0x0d, 0xff, 0x82, 0x00, 0x01, // type 65, singleton, one entry
            0x06, b's', b't', b'r', b'i', b'n', b'g', 0x0c, 0x03, 0x00, 0x01, b'k', // key "k"
            0x00, // nil value
        ]);
        // fix up the message length: everything after the length byte
        let body_len = encoded.len() - 16;
        encoded[15] = body_len as u8;
        assert_eq!(decode_map(&encoded).unwrap(), vec![]);
    }

    #[test]
    fn test_truncated_stream_fails() {
        let encoded = encode_map(&[("id", SessionValue::Int(1))]);
        let err = decode_map(&encoded[..encoded.len() - 2]).unwrap_err();
        assert_eq!(err, GobError::UnexpectedEof);
    }

    #[test]
    fn test_value_without_definition_fails() {
        // value message referencing type 65 with no preceding definition
        let err = decode_map(&[0x04, 0xff, 0x82, 0x00, 0x00]).unwrap_err();
        assert_eq!(err, GobError::UnknownType(65));
    }

    #[test]
    fn test_huge_field_delta_is_rejected() {
        // wire type for id 65 whose first map field delta is 2^63
        let data = [12, 0xff, 0x81, 0x04, 0xf8, 0x80, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode_map(&data).unwrap_err(),
            GobError::Corrupted("field delta out of range")
        );
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(decode_map(&[]).unwrap_err(), GobError::UnexpectedEof);
    }

    #[test]
    fn test_uint_encoding_widths() {
        let mut w = Writer::default();
        w.uint(127);
        w.uint(128);
        w.uint(256);
        assert_eq!(w.buf, vec![0x7f, 0xff, 0x80, 0xfe, 0x01, 0x00]);

        let mut r = Reader::new(&w.buf);
        assert_eq!(r.read_uint().unwrap(), 127);
        assert_eq!(r.read_uint().unwrap(), 128);
        assert_eq!(r.read_uint().unwrap(), 256);
    }
}

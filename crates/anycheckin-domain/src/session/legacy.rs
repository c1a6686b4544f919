//! Byte-pattern scanner for session payloads the gob decoder rejects.
//!
//! It looks for the `string` and `int` interface type names and reads the
//! bytes that follow at fixed offsets. String values are chained as
//! key, value, next key; an integer is assigned to the pending key.
//! Integers are taken from the raw wire bytes without zig-zag decoding, so
//! they come out doubled compared to the gob decoder. Two-byte integers
//! above 127 are read as zero.

use std::collections::HashMap;

use super::value::SessionValue;

const STRING_MARKER: &[u8] = b"string";
const INT_MARKER: &[u8] = b"int";
const STRING_TYPE_TAG: u8 = 0x0c;
const INT_TYPE_TAG: u8 = 0x04;

pub fn scan(data: &[u8]) -> HashMap<String, SessionValue> {
    let mut pairs = HashMap::new();
    let mut last_key = String::new();
    let len = data.len();
    let mut i = 0;

    while i < len {
        if i + STRING_MARKER.len() < len && &data[i..i + STRING_MARKER.len()] == STRING_MARKER {
            i += STRING_MARKER.len();
            if i + 4 < len && data[i] == STRING_TYPE_TAG {
                let val_len = data[i + 3] as usize;
                if val_len > 0 && i + 4 + val_len <= len {
                    let val = String::from_utf8_lossy(&data[i + 4..i + 4 + val_len]).into_owned();
                    if last_key.is_empty() {
                        last_key = val;
                    } else {
                        pairs.insert(last_key, SessionValue::Str(val.clone()));
                        last_key = val;
                    }
                    i += 4 + val_len;
                    continue;
                }
            }
        }

        if i + INT_MARKER.len() < len && &data[i..i + INT_MARKER.len()] == INT_MARKER {
            i += INT_MARKER.len();
            if i + 4 < len && data[i] == INT_TYPE_TAG {
                let val = match data[i + 1] {
                    0x04 => {
                        let high = data[i + 4] as i64;
                        let low = data.get(i + 5).copied().unwrap_or(0) as i64;
                        i += 6;
                        (high << 8) | low
                    }
                    0x02 => {
                        let val = data[i + 3] as i64;
                        i += 4;
                        val
                    }
                    _ => 0,
                };
                if !last_key.is_empty() {
                    pairs.insert(std::mem::take(&mut last_key), SessionValue::Int(val));
                }
                continue;
            }
        }

        i += 1;
    }

    pairs
}

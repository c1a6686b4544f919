use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use super::SessionDecodeError;

/// Returns the `session` cookie value when `raw` looks like a cookie
/// header, otherwise the trimmed input.
pub fn extract_session_value(raw: &str) -> String {
    if raw.contains("session=") || raw.contains(';') {
        let mut found = None;
        for part in raw.split(';') {
            let part = part.trim();
            if let Some((name, value)) = part.split_once('=') {
                if name.trim() == "session" {
                    found = Some(value.trim());
                }
            }
        }
        if let Some(value) = found {
            return value.to_string();
        }
    }
    raw.trim().to_string()
}

/// Undoes the mangling session values pick up when copied around:
/// surrounding quotes, percent-encoding and `+` turned into spaces.
pub fn normalize(value: &str) -> String {
    let mut normalized = value.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
    if normalized.contains('%') {
        if let Ok(unescaped) = urlencoding::decode(&normalized) {
            normalized = unescaped.into_owned();
        }
    }
    normalized.replace(' ', "+")
}

/// Tries URL-safe then standard alphabets, padded then unpadded.
pub fn decode_base64_any(input: &[u8]) -> Result<Vec<u8>, SessionDecodeError> {
    let mut last_error = None;
    for engine in [&URL_SAFE, &URL_SAFE_NO_PAD, &STANDARD, &STANDARD_NO_PAD] {
        match engine.decode(input) {
            Ok(decoded) => return Ok(decoded),
            Err(e) => last_error = Some(e),
        }
    }
    Err(SessionDecodeError::Base64(
        last_error.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

/// Extracts the payload between the first and last `|`, dropping one
/// trailing `|`-separated suffix inside it.
pub fn split_payload(decoded: &[u8]) -> Result<&[u8], SessionDecodeError> {
    let first = decoded.iter().position(|b| *b == b'|');
    let last = decoded.iter().rposition(|b| *b == b'|');
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) if last > first => (first, last),
        _ => return Err(SessionDecodeError::MalformedToken),
    };

    let mut payload = &decoded[first + 1..last];
    if let Some(inner) = payload.iter().rposition(|b| *b == b'|') {
        payload = &payload[..inner];
    }
    if payload.is_empty() {
        return Err(SessionDecodeError::EmptyPayload);
    }
    Ok(payload)
}

mod gob;
mod legacy;
mod token;
mod value;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use gob::GobError;
pub use token::extract_session_value;
pub use value::SessionValue;

/// Identity fields carried inside a site session cookie.
///
/// Recomputed from the raw cookie on every use; never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub user_id: i64,
    pub username: String,
    pub role: i64,
    pub status: i64,
    pub group: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SessionDecodeError {
    #[error("session is empty")]
    Empty,

    #[error("session is not valid base64: {0}")]
    Base64(String),

    #[error("invalid session format")]
    MalformedToken,

    #[error("invalid session data")]
    EmptyPayload,

    #[error("missing user id")]
    MissingUserId,
}

/// Decodes a gorilla-style session cookie (or a cookie header containing
/// one) into the identity it carries.
///
/// The payload is read with the gob decoder first; when that fails or
/// yields no user id the legacy byte scanner gets a try. Either way a
/// non-zero user id is required.
pub fn decode_session(raw: &str) -> Result<SessionInfo, SessionDecodeError> {
    let value = extract_session_value(raw);
    let normalized = token::normalize(&value);
    if normalized.is_empty() {
        return Err(SessionDecodeError::Empty);
    }

    let decoded = token::decode_base64_any(normalized.as_bytes())?;
    let payload = token::split_payload(&decoded)?;
    let gob_data = token::decode_base64_any(payload)?;

    let structured = gob::decode_map(&gob_data).map(|entries| {
        let mut pairs = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            let key = key.as_string();
            if !key.is_empty() {
                pairs.insert(key, value);
            }
        }
        SessionInfo::from_pairs(&pairs)
    });

    let info = match structured {
        Ok(info) if info.user_id != 0 => info,
        _ => SessionInfo::from_pairs(&legacy::scan(&gob_data)),
    };
    if info.user_id == 0 {
        return Err(SessionDecodeError::MissingUserId);
    }
    Ok(info)
}

/// Builds a session cookie value carrying `info`, in the same
/// `base64(date|base64(gob)|mac)` layout the site issues.
pub fn encode_session(info: &SessionInfo, issued_at: i64) -> String {
    let gob_data = gob::encode_map(&[
        ("id", SessionValue::Int(info.user_id)),
        ("username", SessionValue::Str(info.username.clone())),
        ("role", SessionValue::Int(info.role)),
        ("status", SessionValue::Int(info.status)),
        ("group", SessionValue::Str(info.group.clone())),
    ]);

    let mut token = issued_at.to_string().into_bytes();
    token.push(b'|');
    token.extend_from_slice(URL_SAFE.encode(gob_data).as_bytes());
    token.push(b'|');
    token.extend_from_slice(b"unsigned");
    URL_SAFE.encode(token)
}

impl SessionInfo {
    fn from_pairs(pairs: &HashMap<String, SessionValue>) -> Self {
        let int = |key: &str| pairs.get(key).and_then(SessionValue::as_int);
        let text = |key: &str| pairs.get(key).map(SessionValue::as_string);

        let user_id = match int("id") {
            Some(id) if id != 0 => id,
            _ => int("user_id").unwrap_or(0),
        };

        Self {
            user_id,
            username: text("username").unwrap_or_default(),
            role: int("role").unwrap_or(0),
            status: int("status").unwrap_or(0),
            group: text("group").unwrap_or_default(),
        }
    }
}

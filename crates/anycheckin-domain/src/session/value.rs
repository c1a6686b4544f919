use std::fmt;

/// A dynamically typed value pulled out of a session payload.
///
/// Both the gob decoder and the legacy byte scanner produce these, and the
/// identity fields are read through the same coercions regardless of which
/// parser succeeded.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bytes(Vec<u8>),
    Str(String),
}

impl SessionValue {
    /// Integer view of the value: any numeric width, floats truncated,
    /// numeric text parsed. Booleans have no integer view.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SessionValue::Int(v) => Some(*v),
            SessionValue::Uint(v) => Some(*v as i64),
            SessionValue::Float(v) => Some(v.trunc() as i64),
            SessionValue::Str(s) => s.trim().parse().ok(),
            SessionValue::Bytes(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            SessionValue::Bool(_) => None,
        }
    }

    /// Text view of the value; non-text values use their display form.
    pub fn as_string(&self) -> String {
        match self {
            SessionValue::Str(s) => s.clone(),
            SessionValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SessionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionValue::Bool(v) => write!(f, "{}", v),
            SessionValue::Int(v) => write!(f, "{}", v),
            SessionValue::Uint(v) => write!(f, "{}", v),
            SessionValue::Float(v) => write!(f, "{}", v),
            SessionValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            SessionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for SessionValue {
    fn from(value: &str) -> Self {
        SessionValue::Str(value.to_string())
    }
}

impl From<i64> for SessionValue {
    fn from(value: i64) -> Self {
        SessionValue::Int(value)
    }
}

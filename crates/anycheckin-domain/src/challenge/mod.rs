//! Solver for the `acw_sc__v2` anti-bot cookie.
//!
//! The site root embeds a hex nonce as `arg1='...'`. The cookie value is the
//! nonce permuted by a fixed table and XOR-ed pair-wise with a fixed key.

use regex::Regex;
use std::sync::OnceLock;

/// 1-based source positions for each output slot.
const PERMUTATION: [usize; 40] = [
    0xf, 0x23, 0x1d, 0x18, 0x21, 0x10, 0x1, 0x26, 0xa, 0x9, 0x13, 0x1f, 0x28, 0x1b, 0x16, 0x17,
    0x19, 0xd, 0x6, 0xb, 0x27, 0x12, 0x14, 0x8, 0xe, 0x15, 0x20, 0x1a, 0x2, 0x1e, 0x7, 0x4, 0x11,
    0x5, 0x3, 0x1c, 0x22, 0x25, 0xc, 0x24,
];

pub const XOR_KEY: &str = "3000176000856006061501533003690027800375";

/// Name of the cookie the solved value is sent as.
pub const COOKIE_NAME: &str = "acw_sc__v2";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("invalid hex in challenge at position {position}")]
    InvalidHex { position: usize },
}

/// Derives the challenge cookie value from `arg1`.
///
/// Slots not filled from `arg1` hold `'0'`, so an empty nonce yields the
/// key itself.
pub fn solve(arg1: &str) -> Result<String, ChallengeError> {
    let input = arg1.as_bytes();
    let mut scratch = [b'0'; PERMUTATION.len()];
    for (x, byte) in input.iter().enumerate() {
        for (z, source) in PERMUTATION.iter().enumerate() {
            if *source == x + 1 {
                scratch[z] = *byte;
            }
        }
    }

    let key = XOR_KEY.as_bytes();
    let usable = scratch.len().min(key.len()) / 2 * 2;
    let mut out = String::with_capacity(usable);
    for x in (0..usable).step_by(2) {
        let a = hex_pair(&scratch[x..x + 2]).ok_or(ChallengeError::InvalidHex { position: x })?;
        let b = hex_pair(&key[x..x + 2]).ok_or(ChallengeError::InvalidHex { position: x })?;
        out.push_str(&format!("{:02x}", a ^ b));
    }
    Ok(out)
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    let hi = (pair[0] as char).to_digit(16)?;
    let lo = (pair[1] as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Pulls the challenge nonce out of the site's landing page.
pub fn extract_arg1(html: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)arg1='([a-f0-9]+)'").expect("challenge pattern is valid")
    });
    pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

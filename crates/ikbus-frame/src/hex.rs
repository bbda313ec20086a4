//! Hex helpers for logging, tests and the CLI.

use crate::error::{FrameError, Result};

/// Render bytes as uppercase hex pairs separated by single spaces.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Parse whitespace-separated hex bytes such as `"50 03 C8 01 9A"`.
///
/// Each token holds one or two hex digits. Empty input yields no bytes.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    input
        .split_whitespace()
        .map(|token| {
            if token.len() > 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(FrameError::InvalidHex {
                    token: token.to_string(),
                });
            }
            u8::from_str_radix(token, 16).map_err(|_| FrameError::InvalidHex {
                token: token.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_uppercase_pairs() {
        assert_eq!(to_hex(&[0x50, 0x03, 0xC8, 0x01, 0x9A]), "50 03 C8 01 9A");
        assert_eq!(to_hex(&[0x0F]), "0F");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn parses_whitespace_separated_tokens() {
        assert_eq!(parse_hex("50 03 c8\t01\n9A").unwrap(), vec![0x50, 0x03, 0xC8, 0x01, 0x9A]);
        assert_eq!(parse_hex("  f ").unwrap(), vec![0x0F]);
        assert!(parse_hex("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_tokens() {
        assert!(matches!(parse_hex("100"), Err(FrameError::InvalidHex { token }) if token == "100"));
        assert!(matches!(parse_hex("0G"), Err(FrameError::InvalidHex { .. })));
        assert!(matches!(parse_hex("+1"), Err(FrameError::InvalidHex { .. })));
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Random opaque tokens shared by sessions and anti-forgery checks.

use std::fmt::Write;

/// Number of random bytes in a token.
pub const TOKEN_BYTES: usize = 32;

/// Generates a token of [`TOKEN_BYTES`] random bytes, lower-case hex encoded.
pub(crate) fn random_hex_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_BYTES * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Returns true if `value` looks like a token produced by [`random_hex_token`].
pub(crate) fn is_hex_token(value: &str) -> bool {
    value.len() == TOKEN_BYTES * 2
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Compares two strings without short-circuiting on the first difference.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_hex_and_distinct() {
        let first: String = random_hex_token();
        let second: String = random_hex_token();
        assert!(is_hex_token(&first));
        assert!(is_hex_token(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_is_hex_token_rejects_other_shapes() {
        assert!(!is_hex_token("abc"));
        assert!(!is_hex_token(&"G".repeat(64)));
        assert!(!is_hex_token(&"A".repeat(64)));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abcdef", "abcdef"));
        assert!(!constant_time_eq("abcdef", "abcdeg"));
        assert!(!constant_time_eq("abc", "abcd"));
    }
}

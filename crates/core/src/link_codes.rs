//! One-time codes that bind a Telegram account to a Coursely account.
//!
//! A signed-in user asks the API for a code and sends it to the bot with
//! `/link <code>` (or opens the bot's `?start=<code>` deep link). Only the
//! SHA-256 hash of a code is stored, and a code works once.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Minutes a freshly issued code stays valid.
pub const LINK_CODE_TTL_MINS: i32 = 15;

/// Random bytes per code; the code is their lowercase hex form.
const LINK_CODE_BYTES: usize = 16;

/// Generate a code; returns `(code, hash)`.
pub fn generate_link_code() -> (String, String) {
    let mut bytes = [0u8; LINK_CODE_BYTES];
    rand::rng().fill(&mut bytes);
    let code = hex::encode(bytes);
    let hash = hash_link_code(&code);
    (code, hash)
}

/// Hash a code as typed by the user. Surrounding whitespace and case are ignored.
pub fn hash_link_code(code: &str) -> String {
    let normalized = code.trim().to_ascii_lowercase();
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

/// Whether `value` has the shape of an issued code. Email addresses and
/// other free text never do.
pub fn is_link_code(value: &str) -> bool {
    let value = value.trim();
    value.len() == LINK_CODE_BYTES * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_hex_and_unique() {
        let (a, hash_a) = generate_link_code();
        let (b, _) = generate_link_code();
        assert_ne!(a, b);
        assert!(is_link_code(&a));
        assert_eq!(hash_a.len(), 64);
        assert_ne!(hash_a, a);
    }

    #[test]
    fn hash_ignores_case_and_whitespace() {
        let (code, hash) = generate_link_code();
        assert_eq!(hash_link_code(&format!("  {}\n", code.to_uppercase())), hash);
    }

    #[test]
    fn emails_are_not_codes() {
        assert!(!is_link_code("victim@example.com"));
        assert!(!is_link_code(""));
        assert!(!is_link_code("0123456789abcdef"));
        assert!(!is_link_code("zz23456789abcdef0123456789abcdef"));
    }
}

//! Hex rendering, CRC and lock-hash helpers shared by the classifier,
//! codec and repository layers. Every stored hex string column carries a
//! CRC32/IEEE sibling of its lowercase hex form; byte fields are rendered
//! as lowercase hex without a `0x` prefix.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;

/// Lowercase hex, no `0x` prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// CRC32/IEEE of the UTF-8 bytes of a (already-lowercase, already
/// `0x`-stripped) hex string, widened to `i64` to fit a Postgres `BIGINT`
/// column (Postgres has no unsigned integer type).
pub fn crc32_of(hex_str: &str) -> i64 {
    crc32fast::hash(hex_str.as_bytes()) as i64
}

/// The CKB lock script hash: blake2b-256 over the script's molecule
/// serialization, rendered as 64 lowercase hex characters. Real CKB nodes
/// additionally key blake2b with the `ckb-default-hash` personalization;
/// this indexer receives the hash pre-computed from the chain client in
/// production and only falls back to computing it locally (without that
/// personalization) for entries built in tests, where exact chain-hash
/// equivalence doesn't matter.
pub fn script_hash_hex(code_hash: &str, hash_type_byte: u8, args: &[u8]) -> String {
    let code_hash_bytes = hex::decode(strip_0x(code_hash)).unwrap_or_default();
    let mut hasher = Blake2bVar::new(32).expect("32 is a valid blake2b digest size");
    hasher.update(&code_hash_bytes);
    hasher.update(&[hash_type_byte]);
    hasher.update(args);
    let mut out = [0u8; 32];
    hasher.finalize_variable(&mut out).expect("fixed 32-byte buffer");
    to_hex(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_known_vector() {
        assert_eq!(crc32_of("123456789"), 0xCBF4_3926_u32 as i64);
    }

    #[test]
    fn strip_0x_is_idempotent() {
        assert_eq!(strip_0x("0xabcd"), "abcd");
        assert_eq!(strip_0x("abcd"), "abcd");
    }

    #[test]
    fn script_hash_is_64_hex_chars() {
        let h = script_hash_hex("0x00", 1, &[1, 2, 3]);
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

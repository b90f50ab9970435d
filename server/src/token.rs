//! Opaque token generation for session tokens and turn tokens: random bytes
//! from the thread-local CSPRNG, hex-encoded.

use rand::RngCore;

pub fn generate(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Session tokens: long-lived, returned to agents on join.
pub fn session_token() -> String {
    generate(32)
}

/// Turn tokens: short, single-use, rotated every time `to_act` changes.
pub fn turn_token() -> String {
    generate(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_and_unpredictable() {
        let a = session_token();
        let b = session_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

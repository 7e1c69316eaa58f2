//! Secure random byte generation.
//!
//! Every nonce, salt, and file key in this crate comes through here. The
//! source is the operating system CSPRNG, never a seeded generator.

use rand::rngs::OsRng;
use rand::RngCore;

/// Generate `n` cryptographically secure random bytes.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Fill a fixed-size array from the operating system CSPRNG.
pub fn random_array<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes_length() {
        assert_eq!(random_bytes(0).len(), 0);
        assert_eq!(random_bytes(16).len(), 16);
        assert_eq!(random_bytes(1024).len(), 1024);
    }

    #[test]
    fn test_random_bytes_differ() {
        let a = random_bytes(32);
        let b = random_bytes(32);

        assert_ne!(a, b);
    }

    #[test]
    fn test_random_array_differ() {
        let a: [u8; 12] = random_array();
        let b: [u8; 12] = random_array();

        assert_ne!(a, b);
    }
}

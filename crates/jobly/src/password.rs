//! Password hashing for the user model.
//!
//! The scheme is pluggable through [`PasswordHasher`]; [`Sha256Hasher`] is the
//! default. Stored hashes are self-describing:
//!
//! ```text
//! sha256$<rounds>$<salt hex>$<digest hex>
//! ```
//!
//! where the digest is SHA-256 applied `2^rounds` times over the salt and
//! password.

use crate::error::{JoblyError, JoblyResult};
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
const MAX_ROUNDS: u32 = 24;

/// Hashes and verifies user passwords.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> JoblyResult<String>;

    /// Whether `password` matches `stored`. A malformed `stored` value is a
    /// mismatch, not an error.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Salted, iterated SHA-256.
#[derive(Debug, Clone, Copy)]
pub struct Sha256Hasher {
    rounds: u32,
}

impl Sha256Hasher {
    /// `rounds` is a log2 work factor, capped at 24.
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.min(MAX_ROUNDS),
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new(12)
    }
}

fn digest(rounds: u32, salt: &[u8], password: &str) -> [u8; 32] {
    let mut out: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into();
    for _ in 1..(1u64 << rounds) {
        out = Sha256::new()
            .chain_update(out)
            .chain_update(password.as_bytes())
            .finalize()
            .into();
    }
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> JoblyResult<String> {
        if password.is_empty() {
            return Err(JoblyError::bad_request("Password cannot be empty"));
        }
        let salt: [u8; SALT_LEN] = rand::random();
        let digest = digest(self.rounds, &salt, password);
        Ok(format!(
            "{SCHEME}${}${}${}",
            self.rounds,
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        let Ok(rounds) = rounds.parse::<u32>() else {
            return false;
        };
        if rounds > MAX_ROUNDS {
            return false;
        }
        let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
            return false;
        };
        constant_time_eq(&digest(rounds, &salt, password), &expected)
    }
}

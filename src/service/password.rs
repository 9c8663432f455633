//! Salted PBKDF2-HMAC-SHA256 password hashes.
//!
//! Hashes use the Werkzeug string layout,
//! `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`, so accounts created by
//! the previous deployment keep working.

use pbkdf2::pbkdf2_hmac;
use rand::{Rng, distributions::Alphanumeric};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 8;
const METHOD: &str = "pbkdf2:sha256";
const DIGEST_LEN: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hash with a fresh random salt.
    pub fn hash(&self, password: &str) -> String {
        let salt: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SALT_LENGTH)
            .map(char::from)
            .collect();
        encode(password, &salt, self.iterations)
    }

    /// Check `password` against a stored hash string. Hashes in an unknown
    /// format never match.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((iterations, salt, expected)) = parse(stored) else {
            warn!("stored password hash has an unsupported format");
            return false;
        };
        let actual = derive(password, salt, iterations);
        bool::from(actual.as_bytes().ct_eq(expected.as_bytes()))
    }
}

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut key = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    hex::encode(key)
}

fn encode(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{METHOD}:{iterations}${salt}${}",
        derive(password, salt, iterations)
    )
}

fn parse(stored: &str) -> Option<(u32, &str, &str)> {
    let mut parts = stored.splitn(3, '$');
    let method = parts.next()?;
    let salt = parts.next()?;
    let digest = parts.next()?;

    let iterations = method.strip_prefix(METHOD)?.strip_prefix(':')?;
    let iterations: u32 = iterations.parse().ok().filter(|n| *n > 0)?;
    if salt.is_empty() || digest.len() != DIGEST_LEN * 2 {
        return None;
    }
    Some((iterations, salt, digest))
}

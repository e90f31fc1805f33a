//! PBKDF2-SHA256 password hashes in PHC string format.
//!
//! Stored format: `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<digest>`. The round count
//! travels with the hash so it can be raised without invalidating existing accounts.

use pbkdf2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Params, Pbkdf2,
};
use rand::RngCore;

use crate::error::{AuthError, Result};

const SALT_LEN: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    rounds: u32,
}

impl PasswordHasher {
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hash(e.to_string()))?;

        let params = Params {
            rounds: self.rounds,
            ..Params::default()
        };
        let hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored hash. Malformed hashes never verify.
    pub fn verify(stored: &str, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::new(50);
        let stored = hasher.hash("correct horse").unwrap();

        assert!(stored.starts_with("$pbkdf2-sha256$i=50"));
        assert!(PasswordHasher::verify(&stored, "correct horse"));
        assert!(!PasswordHasher::verify(&stored, "battery staple"));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = PasswordHasher::new(5);
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn round_count_comes_from_the_stored_hash() {
        let stored = PasswordHasher::new(3).hash("pw").unwrap();
        assert!(PasswordHasher::verify(&stored, "pw"));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for stored in [
            "",
            "sha256$1$AAAA$AAAA",
            "$pbkdf2-sha256$i=x$AAAAAAAAAAAAAAAAAAAAAA$AAAA",
            "$md5$AAAA$AAAA",
        ] {
            assert!(!PasswordHasher::verify(stored, "pw"), "{stored}");
        }
    }
}

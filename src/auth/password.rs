//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so verification reads the algorithm,
//! cost parameters and salt back from the stored value.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

use super::AuthError;

const SALT_LEN: usize = 16;

/// Cost parameters for new hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Hasher {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    /// Hashes `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut bytes = [0u8; SALT_LEN];
        rand::rng().fill(&mut bytes);
        let salt = SaltString::encode_b64(&bytes).map_err(|e| AuthError::Hash(e.to_string()))?;

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Cheap parameters so tests don't spend seconds hashing.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Checks `password` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`. A stored value that is not a valid hash is an
/// error.
pub fn verify_password(stored: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_phc_string() {
        let hasher = Argon2Hasher::fast();

        let first = hasher.hash("hunter2").unwrap();
        let second = hasher.hash("hunter2").unwrap();

        assert!(first.starts_with("$argon2id$v=19$"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let hash = Argon2Hasher::fast().hash("hunter2").unwrap();

        assert!(verify_password(&hash, "hunter2").unwrap());
        assert!(!verify_password(&hash, "hunter3").unwrap());
    }

    #[test]
    fn test_verify_uses_stored_parameters() {
        let hasher = Argon2Hasher {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        };
        let hash = hasher.hash("pw").unwrap();

        assert!(hash.contains("m=16,t=2,p=1"));
        assert!(verify_password(&hash, "pw").unwrap());
    }

    #[test]
    fn test_default_parameters() {
        let hasher = Argon2Hasher::default();
        assert_eq!(
            (hasher.memory_kib, hasher.iterations, hasher.parallelism),
            (65536, 3, 1)
        );
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(matches!(
            verify_password("plaintext", "plaintext"),
            Err(AuthError::Hash(_))
        ));
    }
}

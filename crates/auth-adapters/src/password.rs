//! Argon2id implementation of the `PasswordHasher` port.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use domains::{DomainError, HashedPassword, PasswordHasher, Result};
use tokio::task;

/// Hashes with a per-password random salt and stores PHC strings, so the
/// parameters used for each hash travel with it.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// `memory_cost_kib`, `time_cost` and `parallelism` are the Argon2
    /// m, t and p parameters.
    pub fn new(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_cost_kib, time_cost, parallelism, None)
            .map_err(|e| DomainError::internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    /// Runs on the blocking pool: Argon2 is CPU-bound by design.
    async fn hash(&self, plaintext: &str) -> Result<HashedPassword> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();

        let phc = task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
        .map_err(|e| DomainError::internal(format!("hashing failed: {e}")))?;

        Ok(HashedPassword::from_phc(phc))
    }

    async fn verify(&self, plaintext: &str, hash: &HashedPassword) -> Result<bool> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();
        let phc = hash.as_str().to_owned();

        task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&phc) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
                    return false;
                }
            };
            argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok()
        })
        .await
        .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum-cost parameters keep the suite fast.
    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new(8, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn hash_is_salted_and_verifies() {
        let hasher = cheap();
        let a = hasher.hash("123dev321").await.unwrap();
        let b = hasher.hash("123dev321").await.unwrap();

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("$argon2id$"));
        assert!(!a.as_str().contains("123dev321"));
        assert!(hasher.verify("123dev321", &a).await.unwrap());
        assert!(!hasher.verify("wrong", &a).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_never_verifies() {
        let hasher = cheap();
        let bogus = HashedPassword::from_phc("plaintext-password");
        assert!(!hasher.verify("plaintext-password", &bogus).await.unwrap());
    }

    #[test]
    fn rejects_impossible_parameters() {
        assert!(Argon2Hasher::new(8, 0, 1).is_err());
    }
}

//! Argon2id password hashing. Both directions run on the blocking pool so a
//! login never stalls the async workers.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use tracing::warn;

use domains::{DomainError, PasswordHasher, Result};

#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom cost parameters, e.g. cheap ones for tests and seeding.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> Result<String> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(DomainError::internal)
        })
        .await
        .map_err(DomainError::internal)?
    }

    async fn verify(&self, password: &str, hash: &str) -> bool {
        let argon = self.argon.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&hash) else {
                warn!("stored password hash does not parse");
                return false;
            };
            argon.verify_password(password.as_bytes(), &parsed).is_ok()
        })
        .await;
        outcome.unwrap_or(false)
    }
}

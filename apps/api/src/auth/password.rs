use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    // v4 UUIDs carry 122 random bits, enough for a 16-byte salt.
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|e| {
        error!("Failed to encode password salt: {e}");
        AppError::Internal(anyhow::anyhow!("salt encoding failed"))
    })?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {e}");
            AppError::Internal(anyhow::anyhow!("password hashing failed"))
        })?;
    Ok(hash.to_string())
}

/// `hash_password` on the blocking pool; argon2 is too slow for a worker thread.
pub async fn hash_password_off_thread(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing task failed: {e}")))?
}

/// `verify_password` on the blocking pool.
pub async fn verify_password_off_thread(password: String, stored_hash: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await {
        Ok(valid) => valid,
        Err(e) => {
            error!("Password verification task failed: {e}");
            false
        }
    }
}

/// False for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Stored password hash is malformed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[tokio::test]
    async fn test_off_thread_round_trip() {
        let hash = hash_password_off_thread("off the worker".into()).await.unwrap();
        assert!(verify_password_off_thread("off the worker".into(), hash.clone()).await);
        assert!(!verify_password_off_thread("on the worker".into(), hash).await);
    }

    #[test]
    fn test_malformed_hash_rejects() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}

use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use serde::Deserialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::routes::{find_user_by_username, User};

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

/// Validates a username/password pair against the credential store.
///
/// When the username does not resolve, a fixed fallback hash is still
/// verified so that the response time does not reveal whether the account
/// exists.
#[tracing::instrument(name = "Validate user credentials", skip(credentials, pool), fields(username = %credentials.username))]
pub async fn validate_credentials(
    credentials: &Credentials,
    pool: &PgPool,
) -> Result<User, AuthError> {
    let mut stored_user = None;
    let mut expected_password_hash = String::from(
        "$argon2id$v=19$m=15000,t=2,p=1$\
        gZiV/M1gPc22ElAH/Jh1Hw$\
        CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno",
    );

    match find_user_by_username(&credentials.username, pool).await {
        Ok(Some(user)) => {
            expected_password_hash = user.password_hash.clone();
            stored_user = Some(user);
        }
        Ok(None) => {
            tracing::debug!("No account found for the supplied username");
        }
        Err(e) => {
            return Err(AuthError::UnexpectedError(anyhow::Error::new(e)));
        }
    }

    verify_password_hash(&expected_password_hash, &credentials.password)?;

    stored_user.ok_or_else(|| AuthError::InvalidCredentials(anyhow::anyhow!("Unknown username.")))
}

#[tracing::instrument(name = "Verify password hash", skip(expected_password_hash, password_candidate))]
pub fn verify_password_hash(
    expected_password_hash: &str,
    password_candidate: &str,
) -> Result<(), AuthError> {
    let expected_password_hash = PasswordHash::new(expected_password_hash)
        .context("Failed to parse hash in PHC string format.")?;

    Argon2::default()
        .verify_password(password_candidate.as_bytes(), &expected_password_hash)
        .context("Invalid password.")
        .map_err(AuthError::InvalidCredentials)
}

#[tracing::instrument(name = "Compute password hash", skip(password))]
pub fn compute_password_hash(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    let params = Params::new(15000, 2, 1, None).map_err(|e| {
        AppError::Unexpected(anyhow::Error::new(e).context("Failed to create Argon2 params"))
    })?;

    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            AppError::Unexpected(anyhow::Error::new(e).context("Failed to hash password"))
        })?
        .to_string();

    Ok(password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_succeeds() {
        let hash = compute_password_hash("secret1").expect("hashing should not fail");
        assert!(verify_password_hash(&hash, "secret1").is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = compute_password_hash("secret1").expect("hashing should not fail");
        let result = verify_password_hash(&hash, "secret2");
        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[test]
    fn hashes_are_salted() {
        let first = compute_password_hash("secret1").expect("hashing should not fail");
        let second = compute_password_hash("secret1").expect("hashing should not fail");
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_panic() {
        assert!(verify_password_hash("not-a-phc-string", "secret1").is_err());
    }
}

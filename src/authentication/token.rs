use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Session tokens stay valid for a fixed window; there is no server-side
/// revocation list.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub exp: usize,
}

/// The (userId, username) pair recovered from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

/// Signs and verifies self-contained session tokens. Built once at startup
/// from the process-wide signing secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let claims = Claims {
            sub: identity.username.clone(),
            user_id: identity.user_id.clone(),
            exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_VALIDITY_DAYS)).timestamp()
                as usize,
        };

        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding).map_err(|e| {
            AppError::Unexpected(anyhow::Error::new(e).context("Failed to encode session token"))
        })
    }

    /// Malformed, tampered, and expired tokens are indistinguishable to the
    /// caller: all of them come back as `None`.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;

        Some(Identity {
            user_id: data.claims.user_id,
            username: data.claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::from_secret("test-signing-secret")
    }

    fn identity() -> Identity {
        Identity {
            user_id: "42".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn issued_token_verifies_to_the_same_identity() {
        let codec = codec();
        let token = codec.issue(&identity()).expect("issuing should not fail");
        assert_eq!(codec.verify(&token), Some(identity()));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let codec = codec();
        let token = codec.issue(&identity()).expect("issuing should not fail");

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');

        assert_eq!(codec.verify(&tampered), None);
        assert_eq!(codec.verify("not-a-token"), None);
    }

    #[test]
    fn token_signed_with_a_different_secret_is_invalid() {
        let token = codec().issue(&identity()).expect("issuing should not fail");
        let other = TokenCodec::from_secret("some-other-secret");
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn expired_token_is_invalid() {
        let codec = codec();
        let claims = Claims {
            sub: "alice".to_string(),
            user_id: "42".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::days(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .expect("encoding should not fail");

        assert_eq!(codec.verify(&token), None);
    }
}

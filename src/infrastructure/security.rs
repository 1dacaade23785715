use crate::infrastructure::config::AuthSettings;
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Argon2 parameters for 50-150ms target latency
const ARGON2_M_COST: u32 = 19456; // 19 MB
const ARGON2_T_COST: u32 = 2; // 2 iterations
const ARGON2_P_COST: u32 = 1; // 1 parallelism

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // username
    iat: i64,
    exp: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature is invalid or token is malformed")]
    InvalidSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

fn hasher() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    let params = argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
        .map_err(argon2::password_hash::Error::from)?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = hasher()?.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Checks `password` against a stored PHC string. A digest that cannot be
/// parsed is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    let Ok(argon2) = hasher() else {
        return false;
    };
    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Issues and verifies HS256 bearer tokens bound to a username.
///
/// Tokens carry an absolute expiry of `iat + ttl`; there is no server-side
/// state, so a token stays valid until that instant.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against our own clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(&settings.jwt_secret, settings.access_token_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    pub fn issue_at(&self, subject: &str, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Signature first, then `now < exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::InvalidSignature)?;

        if now >= token_data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, Duration::minutes(30))
    }

    fn tamper_signature(token: &str) -> String {
        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let replacement = if first == 'A' { 'B' } else { 'A' };
        format!("{}.{}{}", unsigned, replacement, &signature[1..])
    }

    #[test]
    fn test_hash_password_generates_valid_hash() {
        let password = "test_password_123";
        let hash = hash_password(password).unwrap();

        assert!(!hash.is_empty());
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_password_same_password_produces_different_hashes() {
        let password = "same_password";

        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        // Random salt per call
        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1));
        assert!(verify_password(password, &hash2));
    }

    #[test]
    fn test_verify_password_correct_password_returns_true() {
        let hash = hash_password("pw123").unwrap();
        assert!(verify_password("pw123", &hash));
    }

    #[test]
    fn test_verify_password_incorrect_password_returns_false() {
        let hash = hash_password("pw123").unwrap();
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("pw1234", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_verify_password_malformed_hash_returns_false() {
        assert!(!verify_password("test_password", "not_a_valid_hash"));
        assert!(!verify_password("test_password", ""));
        assert!(!verify_password("test_password", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn test_verify_password_with_unicode_and_special_characters() {
        for password in ["", "p@ssw0rd!#$%^&*()", "пароль123"] {
            let hash = hash_password(password).unwrap();
            assert!(verify_password(password, &hash));
        }
    }

    #[test]
    fn test_issue_creates_three_part_token() {
        let token = issuer().issue("alice").unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_verify_returns_subject_right_after_issue() {
        let issuer = issuer();
        let token = issuer.issue("alice").unwrap();

        assert_eq!(issuer.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn test_verify_accepts_token_until_just_before_expiry() {
        let issuer = issuer();
        let now = 1_700_000_000;
        let token = issuer.issue_at("alice", now).unwrap();
        let ttl = issuer.ttl().num_seconds();

        assert_eq!(issuer.verify_at(&token, now).unwrap(), "alice");
        assert_eq!(issuer.verify_at(&token, now + ttl / 2).unwrap(), "alice");
        assert_eq!(issuer.verify_at(&token, now + ttl - 1).unwrap(), "alice");
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let issuer = issuer();
        let now = 1_700_000_000;
        let token = issuer.issue_at("alice", now).unwrap();
        let ttl = issuer.ttl().num_seconds();

        assert_eq!(issuer.verify_at(&token, now + ttl), Err(TokenError::Expired));
        assert_eq!(
            issuer.verify_at(&token, now + ttl + 3600),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_verify_rejects_token_issued_in_the_past() {
        // wall-clock verify of a token whose expiry has long passed
        let issuer = issuer();
        let token = issuer.issue_at("alice", 1_000_000).unwrap();

        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let issuer = issuer();
        let token = issuer.issue("alice").unwrap();
        let tampered = tamper_signature(&token);

        assert_ne!(token, tampered);
        assert_eq!(issuer.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_signature_is_checked_before_expiry() {
        let issuer = issuer();
        let token = issuer.issue_at("alice", 1_000_000).unwrap();

        assert_eq!(
            issuer.verify(&tamper_signature(&token)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_rejects_malformed_token() {
        let issuer = issuer();

        assert_eq!(
            issuer.verify("invalid.token.here"),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(issuer.verify(""), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_verify_rejects_token_signed_with_other_secret() {
        let token = TokenIssuer::new("correct_secret", Duration::minutes(30))
            .issue("alice")
            .unwrap();
        let result = TokenIssuer::new("wrong_secret", Duration::minutes(30)).verify(&token);

        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_different_subjects_produce_different_tokens() {
        let issuer = issuer();
        let now = 1_700_000_000;

        let token1 = issuer.issue_at("user1", now).unwrap();
        let token2 = issuer.issue_at("user2", now).unwrap();

        assert_ne!(token1, token2);
    }

    #[test]
    fn test_from_settings_uses_configured_ttl() {
        let settings = AuthSettings::new("settings_secret", Duration::minutes(5));
        let issuer = TokenIssuer::from_settings(&settings);

        assert_eq!(issuer.ttl(), Duration::minutes(5));
        let token = issuer.issue("alice").unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), "alice");
    }
}

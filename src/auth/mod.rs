pub mod cache;
pub mod validator;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use crate::config::SecurityConfig;

pub use cache::TokenCache;
pub use validator::CredentialValidator;

/// Credential failures. The first two are malformed requests (403), a token
/// that fails verification is a bad credential (401).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingCredentials,

    #[error("Invalid authentication credentials")]
    InvalidScheme,

    #[error("invalid_bearer_token")]
    InvalidToken(String),

    #[error("Invalid token key configuration: {0}")]
    InvalidKey(String),
}

impl AuthError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::MissingCredentials | AuthError::InvalidScheme)
    }
}

/// Cryptographic check of a bearer token
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<(), AuthError>;
}

/// Verifies signature, issuer, audience and expiry against a fixed key
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(
        algorithm: &str,
        public_key: &str,
        issuer: &str,
        audience: &str,
    ) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| AuthError::InvalidKey(format!("unsupported algorithm {}", algorithm)))?;

        let key = decoding_key(algorithm, public_key)?;

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Ok(Self { key, validation })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(
            &config.algorithm,
            &config.realm_public_key,
            &config.issuer,
            &config.audience,
        )
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<(), AuthError> {
        decode::<Value>(token, &self.key, &self.validation)
            .map(|_| ())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Wrap a bare base64 key body in PEM armor; full PEM documents pass through
pub fn wrap_public_key(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("-----BEGIN") {
        key.to_string()
    } else {
        format!("-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----", key)
    }
}

fn decoding_key(algorithm: Algorithm, key: &str) -> Result<DecodingKey, AuthError> {
    let invalid = |e: jsonwebtoken::errors::Error| AuthError::InvalidKey(e.to_string());

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Ok(DecodingKey::from_secret(key.as_bytes()))
        }
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => {
            DecodingKey::from_rsa_pem(wrap_public_key(key).as_bytes()).map_err(invalid)
        }
        Algorithm::ES256 | Algorithm::ES384 => {
            DecodingKey::from_ec_pem(wrap_public_key(key).as_bytes()).map_err(invalid)
        }
        Algorithm::EdDSA => {
            DecodingKey::from_ed_pem(wrap_public_key(key).as_bytes()).map_err(invalid)
        }
    }
}

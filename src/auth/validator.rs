use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{AuthError, JwtVerifier, TokenCache, TokenVerifier};
use crate::config::SecurityConfig;

/// Guards every data request: checks the bearer scheme, verifies the token
/// and memoizes successes for the current cache window.
///
/// A memoized verdict is trusted until the window sweep, even if the
/// token's own `exp` passes in the meantime.
pub struct CredentialValidator {
    verifier: Box<dyn TokenVerifier>,
    cache: Mutex<TokenCache>,
}

impl CredentialValidator {
    pub fn new(
        verifier: impl TokenVerifier + 'static,
        lifetime: Duration,
        max_size: usize,
    ) -> Self {
        Self {
            verifier: Box::new(verifier),
            cache: Mutex::new(TokenCache::new(lifetime, max_size, Instant::now())),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Ok(Self::new(
            JwtVerifier::from_config(config)?,
            config.token_cache_lifetime(),
            config.token_cache_max_size,
        ))
    }

    /// Validate a raw `Authorization` header value
    pub fn authorize(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = bearer_credentials(header)?;
        self.validate(token)
    }

    pub fn validate(&self, token: &str) -> Result<(), AuthError> {
        self.validate_at(token, Instant::now())
    }

    pub fn validate_at(&self, token: &str, now: Instant) -> Result<(), AuthError> {
        if self.cache().lookup_or_clear(token, now) {
            debug!("Bearer token served from cache");
            return Ok(());
        }

        // Lock is not held during verification
        if let Err(e) = self.verifier.verify(token) {
            warn!("Rejected bearer token: {:?}", e);
            return Err(e);
        }

        self.cache().insert(token);
        Ok(())
    }

    fn cache(&self) -> MutexGuard<'_, TokenCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Split `Authorization: <scheme> <credentials>` and require the Bearer scheme
pub fn bearer_credentials(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.map(str::trim).unwrap_or_default();
    let (scheme, credentials) = header.split_once(' ').unwrap_or((header, ""));
    let credentials = credentials.trim();

    if scheme.is_empty() || credentials.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    Ok(credentials)
}

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the discrete fields below
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Pool size (min and max are pinned to the same value)
    pub connection_number: u32,
    pub connection_timeout: u64,
    /// Nation code used in partition table names
    pub nation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub algorithm: String,
    pub issuer: String,
    pub audience: String,
    /// Bare base64 key body or a full PEM document
    pub realm_public_key: String,
    pub token_cache_lifetime_secs: u64,
    pub token_cache_max_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
}

impl SecurityConfig {
    pub fn token_cache_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_cache_lifetime_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("POSTGRES_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("POSTGRES_PORT") {
            self.database.port = parse_var("POSTGRES_PORT", &v)?;
        }
        if let Ok(v) = env::var("POSTGRES_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("POSTGRES_PWD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("POSTGRES_DB") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("CONNECTION_NUMBER") {
            self.database.connection_number = parse_var("CONNECTION_NUMBER", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Ok(v) = env::var("NATION") {
            self.database.nation = v;
        }

        // Security overrides
        if let Ok(v) = env::var("ALGORITHM") {
            self.security.algorithm = v;
        }
        if let Ok(v) = env::var("ISSUER") {
            self.security.issuer = v;
        }
        if let Ok(v) = env::var("AUDIENCE") {
            self.security.audience = v;
        }
        if let Ok(v) = env::var("REALM_PUBLIC_KEY") {
            self.security.realm_public_key = v;
        }
        if let Ok(v) = env::var("TOKEN_CACHE_LIFETIME_SECS") {
            self.security.token_cache_lifetime_secs = parse_var("TOKEN_CACHE_LIFETIME_SECS", &v)?;
        }
        if let Ok(v) = env::var("TOKEN_CACHE_MAX_SIZE") {
            self.security.token_cache_max_size = parse_var("TOKEN_CACHE_MAX_SIZE", &v)?;
        }

        // Server overrides
        if let Some(v) = env::var("SERVER_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_var("SERVER_PORT", &v)?;
        }
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("RUST_LOG") {
            self.server.log_filter = v;
        }

        Ok(self)
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.nation.is_empty() {
            return Err(ConfigError::Missing("NATION"));
        }
        if !self.database.nation.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid {
                name: "NATION",
                value: self.database.nation.clone(),
            });
        }
        if self.database.url.is_none() && self.database.host.is_empty() {
            return Err(ConfigError::Missing("POSTGRES_HOST"));
        }
        if self.database.connection_number == 0 {
            return Err(ConfigError::Invalid {
                name: "CONNECTION_NUMBER",
                value: "0".to_string(),
            });
        }
        if self.security.realm_public_key.trim().is_empty() {
            return Err(ConfigError::Missing("REALM_PUBLIC_KEY"));
        }
        if self.security.issuer.is_empty() {
            return Err(ConfigError::Missing("ISSUER"));
        }
        if self.security.audience.is_empty() {
            return Err(ConfigError::Missing("AUDIENCE"));
        }
        if self.security.token_cache_max_size == 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_CACHE_MAX_SIZE",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                connection_number: 5,
                connection_timeout: 30,
                ..DatabaseConfig::local()
            },
            security: SecurityConfig::unset(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                log_filter: "galileo_api=debug,tower_http=debug".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                connection_number: 10,
                connection_timeout: 10,
                ..DatabaseConfig::local()
            },
            security: SecurityConfig::unset(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                log_filter: "galileo_api=info,tower_http=info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                connection_number: 20,
                connection_timeout: 5,
                ..DatabaseConfig::local()
            },
            security: SecurityConfig::unset(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                log_filter: "galileo_api=info,tower_http=warn".to_string(),
            },
        }
    }
}

impl DatabaseConfig {
    fn local() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "galileo".to_string(),
            connection_number: 5,
            connection_timeout: 30,
            nation: String::new(),
        }
    }
}

impl SecurityConfig {
    fn unset() -> Self {
        Self {
            algorithm: "RS256".to_string(),
            issuer: String::new(),
            audience: String::new(),
            realm_public_key: String::new(),
            token_cache_lifetime_secs: 180,
            token_cache_max_size: 16,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<Result<AppConfig, ConfigError>> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> Result<&'static AppConfig, &'static ConfigError> {
    CONFIG.as_ref()
}

use chrono::Duration;
use dotenv::dotenv;
use std::fmt;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://notes.db?mode=rwc";
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `DATABASE_URL` value selecting the in-process store.
pub const MEMORY_STORAGE: &str = "memory";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Token signing settings, fixed for the lifetime of the process.
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    access_token_ttl: Duration,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>, access_token_ttl: Duration) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field(
                "access_token_expire_minutes",
                &self.access_token_ttl.num_minutes(),
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage: Storage,
    pub auth: AuthSettings,
    pub log_level: String,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_token_ttl = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => {
                let minutes = raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                    name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                    reason: e.to_string(),
                })?;
                if minutes <= 0 {
                    return Err(ConfigError::Invalid {
                        name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                        reason: "must be a positive number of minutes".to_string(),
                    });
                }
                Duration::try_minutes(minutes).ok_or_else(|| ConfigError::Invalid {
                    name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                    reason: "token lifetime is out of range".to_string(),
                })?
            }
            None => Duration::minutes(DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES),
        };

        let storage = match lookup("DATABASE_URL") {
            Some(url) if url.trim() == MEMORY_STORAGE => Storage::Memory,
            Some(url) if !url.trim().is_empty() => Storage::Sqlite(url.trim().to_string()),
            _ => Storage::Sqlite(DEFAULT_DATABASE_URL.to_string()),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            storage,
            auth: AuthSettings::new(jwt_secret, access_token_ttl),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::security::TokenIssuer;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied_when_only_secret_set() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(
            config.storage,
            Storage::Sqlite(DEFAULT_DATABASE_URL.to_string())
        );
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.access_token_ttl(), Duration::minutes(30));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::Missing("JWT_SECRET"));
        assert_eq!(
            load(&[("JWT_SECRET", "   ")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn test_token_lifetime_must_be_positive_integer() {
        let err = load(&[
            ("JWT_SECRET", "s"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "abc"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ACCESS_TOKEN_EXPIRE_MINUTES", .. }));

        let err = load(&[("JWT_SECRET", "s"), ("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let config = load(&[("JWT_SECRET", "s"), ("ACCESS_TOKEN_EXPIRE_MINUTES", "15")]).unwrap();
        assert_eq!(config.auth.access_token_ttl(), Duration::minutes(15));
    }

    #[test]
    fn test_token_lifetime_beyond_duration_range_is_rejected() {
        let err = load(&[
            ("JWT_SECRET", "s"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", &i64::MAX.to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ACCESS_TOKEN_EXPIRE_MINUTES", .. }));

        // largest accepted lifetime still builds a working issuer
        let max_minutes = Duration::MAX.num_minutes();
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", &max_minutes.to_string()),
        ])
        .unwrap();
        assert_eq!(config.auth.access_token_ttl().num_minutes(), max_minutes);

        let issuer = TokenIssuer::from_settings(&config.auth);
        let token = issuer.issue("alice").unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn test_storage_selection() {
        let config = load(&[("JWT_SECRET", "s"), ("DATABASE_URL", "memory")]).unwrap();
        assert_eq!(config.storage, Storage::Memory);

        let config = load(&[("JWT_SECRET", "s"), ("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.storage, Storage::Sqlite("sqlite::memory:".to_string()));
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let config = load(&[("JWT_SECRET", "very-secret-value")]).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("very-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}

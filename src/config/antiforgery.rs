use std::env;

use axum_extra::extract::cookie::SameSite;
use chrono::Duration;
use tracing::warn;

use crate::error::ConfigError;

pub const VALIDITY_ENV_VAR: &str = "AES_CSRF_VALIDITY_HOURS";
pub const DEFAULT_VALIDITY_HOURS: i64 = 12;

/// Attributes applied to the antiforgery cookie when it is written.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        CookieOptions {
            path: "/".to_string(),
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AntiforgeryConfig {
    /// How long an issued token is accepted for.
    pub validity: Duration,
    pub cookie: CookieOptions,
}

impl Default for AntiforgeryConfig {
    fn default() -> Self {
        AntiforgeryConfig {
            validity: Duration::hours(DEFAULT_VALIDITY_HOURS),
            cookie: CookieOptions::default(),
        }
    }
}

impl AntiforgeryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let validity = match env::var(VALIDITY_ENV_VAR) {
            Ok(value) => {
                value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|hours| *hours > 0)
                    .and_then(Duration::try_hours)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        name: VALIDITY_ENV_VAR.to_string(),
                        value: value.clone(),
                    })?
            }
            Err(_) => Duration::hours(DEFAULT_VALIDITY_HOURS),
        };

        let is_production = current_environment() == "production";
        if !is_production {
            warn!("ENVIRONMENT is not production; antiforgery cookie is sent without the Secure flag");
        }

        Ok(AntiforgeryConfig {
            validity,
            cookie: CookieOptions {
                secure: is_production,
                ..CookieOptions::default()
            },
        })
    }

    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AntiforgeryConfig::default();
        assert_eq!(config.validity, Duration::hours(12));
        assert_eq!(config.cookie.path, "/");
        assert!(config.cookie.http_only);
        assert!(!config.cookie.secure);
        assert_eq!(config.cookie.same_site, SameSite::Lax);
    }

    #[test]
    fn test_with_validity() {
        let config = AntiforgeryConfig::default().with_validity(Duration::minutes(5));
        assert_eq!(config.validity, Duration::minutes(5));
    }
}

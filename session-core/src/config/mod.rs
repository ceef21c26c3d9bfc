//! Environment-driven configuration for the session core.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub environment: Environment,
    /// Bound on sign-in/sign-up/sign-out provider calls; on expiry the UI
    /// surfaces a retryable error.
    #[serde(skip, default = "default_auth_timeout")]
    pub auth_timeout: Duration,
    /// Company name when the identity carries neither a full name nor a
    /// usable email local part.
    pub fallback_company_name: String,
    pub routes: RouteConfig,
}

fn default_auth_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

/// Portal route table, mirroring the client router.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub landing: String,
    pub admin_sign_in: String,
    pub company_sign_in: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl SessionConfig {
    /// Load configuration, reading a local `.env` file first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str.parse().map_err(|message| ConfigError::Invalid {
            key: "ENVIRONMENT".to_string(),
            message,
        })?;

        let is_prod = environment == Environment::Prod;

        let timeout_secs: u64 = get_env("SESSION_AUTH_TIMEOUT_SECS", Some("10"), is_prod)?
            .parse()
            .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                key: "SESSION_AUTH_TIMEOUT_SECS".to_string(),
                message: e.to_string(),
            })?;

        let config = SessionConfig {
            environment,
            auth_timeout: Duration::from_secs(timeout_secs),
            fallback_company_name: get_env("FALLBACK_COMPANY_NAME", Some("My Company"), is_prod)?,
            routes: RouteConfig {
                landing: get_env("LANDING_ROUTE", Some("/"), is_prod)?,
                admin_sign_in: get_env("ADMIN_SIGN_IN_ROUTE", Some("/admin/login"), is_prod)?,
                company_sign_in: get_env("COMPANY_SIGN_IN_ROUTE", Some("/auth/login"), is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "SESSION_AUTH_TIMEOUT_SECS".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        for (key, route) in [
            ("LANDING_ROUTE", &self.routes.landing),
            ("ADMIN_SIGN_IN_ROUTE", &self.routes.admin_sign_in),
            ("COMPANY_SIGN_IN_ROUTE", &self.routes.company_sign_in),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    message: format!("route '{}' must start with '/'", route),
                });
            }
        }

        Ok(())
    }
}

impl Default for SessionConfig {
    /// Dev defaults matching the portal's router.
    fn default() -> Self {
        Self {
            environment: Environment::Dev,
            auth_timeout: default_auth_timeout(),
            fallback_company_name: "My Company".to_string(),
            routes: RouteConfig {
                landing: "/".to_string(),
                admin_sign_in: "/admin/login".to_string(),
                company_sign_in: "/auth/login".to_string(),
            },
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let is_prod = env::var("ENVIRONMENT").as_deref() == Ok("prod");
        Ok(Self {
            url: get_env("DATABASE_URL", None, is_prod)?,
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", "10", is_prod)?,
            min_connections: parse_env("DATABASE_MIN_CONNECTIONS", "1", is_prod)?,
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            // Production requires every key to be set explicitly.
            if is_prod {
                Err(ConfigError::MissingVar(key.to_string()))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(ConfigError::MissingVar(key.to_string()))
            }
        }
    }
}

fn parse_env(key: &str, default: &str, is_prod: bool) -> Result<u32, ConfigError> {
    get_env(key, Some(default), is_prod)?
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
            key: key.to_string(),
            message: e.to_string(),
        })
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_portal_router() {
        let config = SessionConfig::default();
        assert_eq!(config.routes.admin_sign_in, "/admin/login");
        assert_eq!(config.routes.company_sign_in, "/auth/login");
        assert_eq!(config.routes.landing, "/");
        assert_eq!(config.fallback_company_name, "My Company");
    }

    #[test]
    fn rejects_route_without_leading_slash() {
        let mut config = SessionConfig::default();
        config.routes.landing = "landing".to_string();
        assert!(config.validate().is_err());
    }
}

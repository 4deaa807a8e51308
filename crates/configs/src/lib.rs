//! # configs
//!
//! Layered settings for the blog binaries. Later layers win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/local.toml` (both optional)
//! 3. `BLOG__SECTION__KEY` environment variables
//! 4. the conventional `DATABASE_URL`, `JWT_SECRET` and `PORT` variables
//!
//! A `.env` file in the working directory is loaded first, if present.

use std::env;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("failed to read .env file: {0}")]
    EnvFile(dotenvy::Error),

    #[error("setting `{0}` must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub pagination: PaginationSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    /// HMAC key for signing bearer tokens
    pub jwt_secret: SecretString,
    pub argon2_memory_cost_kib: u32,
    pub argon2_time_cost: u32,
    pub argon2_parallelism: u32,
}

#[derive(Debug, Deserialize)]
pub struct PaginationSettings {
    pub default_limit: i64,
    pub max_limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Settings {
    /// Reads `.env`, config files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        env_file(dotenvy::dotenv())?;

        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("BLOG")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?;

        Self::from_builder(builder)
    }

    /// Built-in defaults only. Secrets have no default.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 5)?
            .set_default("auth.argon2_memory_cost_kib", 19 * 1024)?
            .set_default("auth.argon2_time_cost", 2)?
            .set_default("auth.argon2_parallelism", 1)?
            .set_default("pagination.default_limit", 10)?
            .set_default("pagination.max_limit", 100)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().is_empty() {
            return Err(ConfigError::Empty("auth.jwt_secret"));
        }
        if self.database.url.expose_secret().is_empty() {
            return Err(ConfigError::Empty("database.url"));
        }
        Ok(())
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is an error.
fn env_file<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secrets() -> ConfigBuilder<DefaultState> {
        Settings::defaults()
            .unwrap()
            .set_override("database.url", "postgres://localhost/blog")
            .unwrap()
            .set_override("auth.jwt_secret", "s3cret")
            .unwrap()
    }

    #[test]
    fn defaults_fill_everything_but_secrets() {
        let settings = Settings::from_builder(with_secrets()).unwrap();
        assert_eq!(settings.server.addr(), "0.0.0.0:3000");
        assert_eq!(settings.pagination.default_limit, 10);
        assert_eq!(settings.pagination.max_limit, 100);
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let builder = Settings::defaults()
            .unwrap()
            .set_override("database.url", "postgres://localhost/blog")
            .unwrap();
        assert!(Settings::from_builder(builder).is_err());
    }

    #[test]
    fn empty_secret_is_an_error() {
        let builder = with_secrets().set_override("auth.jwt_secret", "").unwrap();
        assert!(matches!(
            Settings::from_builder(builder),
            Err(ConfigError::Empty("auth.jwt_secret"))
        ));
    }

    #[test]
    fn string_port_is_coerced() {
        let builder = with_secrets().set_override("server.port", "8080").unwrap();
        assert_eq!(Settings::from_builder(builder).unwrap().server.port, 8080);
    }

    #[test]
    fn absent_env_file_is_ignored() {
        let path = env::temp_dir().join("blog-configs-absent.env");
        assert!(env_file(dotenvy::from_path(&path)).is_ok());
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let path = env::temp_dir().join(format!("blog-configs-{}.env", std::process::id()));
        std::fs::write(&path, "BLOG_CONFIGS_TEST='unterminated\n").unwrap();
        let result = env_file(dotenvy::from_path(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::EnvFile(_))));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let settings = Settings::from_builder(with_secrets()).unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }
}

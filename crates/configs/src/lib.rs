//! # configs
//!
//! Layered settings for doot, lowest priority first:
//!
//! 1. built-in defaults
//! 2. `doot.toml` in the working directory, if present
//! 3. `DOOT__SECTION__KEY` environment variables (e.g. `DOOT__SERVER__PORT=8080`)
//! 4. the conventional `DATABASE_URL` and `SECRET` variables
//!
//! `.env` is read into the process environment first.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("SECRET is not set; it signs session cookies and is required")]
    MissingSecret,
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: String,
}

impl ServerSettings {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug)]
pub struct DatabaseSettings {
    /// `None` runs the in-memory store.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

#[derive(Debug)]
pub struct SessionSettings {
    pub secret: SecretString,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// An `EnvFilter` directive, e.g. `info,sqlx=warn`
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug)]
pub struct Settings {
    pub mode: Mode,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, `doot.toml` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), ".env loaded");
        }
        Self::from_sources(Some("doot"), std::env::vars().collect())
    }

    /// Builds settings from an optional config file (extension inferred) and
    /// an explicit variable map standing in for the environment.
    pub fn from_sources(file: Option<&str>, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("mode", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.static_dir", "static")?
            .set_default("database.max_connections", 10)?
            .set_default("session.ttl_days", 30)?
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let raw: RawSettings = builder
            .add_source(
                Environment::with_prefix("DOOT")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("database.url", vars.get("DATABASE_URL").cloned())?
            .set_override_option("session.secret", vars.get("SECRET").cloned())?
            .build()?
            .try_deserialize()?;

        raw.finish()
    }

    pub fn is_production(&self) -> bool {
        self.mode == Mode::Production
    }
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    mode: Mode,
    server: ServerSettings,
    database: RawDatabase,
    session: RawSession,
    log: LogSettings,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    #[serde(default)]
    url: Option<String>,
    max_connections: u32,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    #[serde(default)]
    secret: Option<String>,
    ttl_days: i64,
}

impl RawSettings {
    fn finish(self) -> Result<Settings, ConfigError> {
        let secret = self
            .session
            .secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;
        if self.session.ttl_days < 1 {
            return Err(ConfigError::Invalid {
                key: "session.ttl_days",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Settings {
            mode: self.mode,
            server: self.server,
            database: DatabaseSettings {
                url: self
                    .database
                    .url
                    .filter(|u| !u.trim().is_empty())
                    .map(SecretString::from),
                max_connections: self.database.max_connections,
            },
            session: SessionSettings {
                secret: SecretString::from(secret),
                ttl_days: self.session.ttl_days,
            },
            log: self.log,
        })
    }
}

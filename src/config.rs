use crate::error::InventoryError;
use axum_extra::extract::cookie::Key;
use base64::Engine;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prefix for environment overrides, e.g. `DISPLAYDB_DATABASE__QUERY_TIMEOUT_SECS=5`.
pub const ENV_PREFIX: &str = "DISPLAYDB_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    /// Base64 master key for the private session cookie. Random per process when unset.
    pub cookie_key: Option<String>,
    pub insecure_cookie: bool,
    pub session: SessionConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: DbDriver,
    pub port: u16,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub query_timeout_secs: u64,
    /// Create `Model` and `DigitalDisplay` after a successful login probe if they are absent.
    pub bootstrap_schema: bool,
}

/// Which backend the submitted login credentials are interpreted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    Mysql,
    /// Embedded file database; the submitted `database` field is the file path.
    Sqlite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            loglevel: "info".to_string(),
            cookie_key: None,
            insecure_cookie: true,
            session: SessionConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DbDriver::Mysql,
            port: 3306,
            max_connections: 10,
            acquire_timeout_secs: 5,
            query_timeout_secs: 10,
            bootstrap_schema: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with `DISPLAYDB_*` environment variables.
    pub fn load() -> Result<Self, InventoryError> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| InventoryError::Config(e.to_string()))
    }

    pub fn cookie_key(&self) -> Result<Key, InventoryError> {
        let Some(encoded) = self.cookie_key.as_deref() else {
            return Ok(Key::generate());
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| InventoryError::Config(format!("cookie_key is not base64: {e}")))?;
        Key::try_from(bytes.as_slice())
            .map_err(|_| InventoryError::Config("cookie_key must be at least 64 bytes".to_string()))
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

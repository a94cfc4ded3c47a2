use crate::config::{DatabaseConfig, DbDriver};
use serde::Deserialize;
use sqlx::AnyPool;
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Connection parameters submitted on the login form and kept for the session.
///
/// Also the cache key for pooled connections, so two sessions logged in with
/// identical parameters share one pool.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct DbCredentials {
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub driver: DbDriver,
    pub default_port: u16,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
}

impl From<&DatabaseConfig> for PoolSettings {
    fn from(cfg: &DatabaseConfig) -> Self {
        Self {
            driver: cfg.driver,
            default_port: cfg.port,
            max_connections: cfg.max_connections.max(1),
            acquire_timeout: cfg.acquire_timeout(),
            query_timeout: cfg.query_timeout(),
        }
    }
}

impl DbCredentials {
    /// Render a driver URL. Credentials are percent-encoded by `url`.
    pub fn connect_url(&self, settings: &PoolSettings) -> Result<String, sqlx::Error> {
        match settings.driver {
            DbDriver::Sqlite => Ok(format!("sqlite:{}?mode=rw", self.database)),
            DbDriver::Mysql => {
                let mut url = Url::parse(&format!("mysql://{}", self.host.trim()))
                    .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
                // Anything beyond host[:port] in the host field is rejected.
                if url.host_str().is_none_or(str::is_empty)
                    || !url.username().is_empty()
                    || url.password().is_some()
                    || !matches!(url.path(), "" | "/")
                    || url.query().is_some()
                    || url.fragment().is_some()
                {
                    return Err(sqlx::Error::Configuration(
                        format!("invalid host: {:?}", self.host).into(),
                    ));
                }
                if url.port().is_none() {
                    let _ = url.set_port(Some(settings.default_port));
                }
                let _ = url.set_username(&self.username);
                let password = (!self.password.is_empty()).then_some(self.password.as_str());
                let _ = url.set_password(password);
                url.path_segments_mut()
                    .map_err(|_| sqlx::Error::Configuration("host URL cannot carry a path".into()))?
                    .clear()
                    .push(&self.database);
                Ok(url.to_string())
            }
        }
    }

    /// Build a pool for these credentials. Connecting eagerly surfaces bad
    /// credentials before the login probe runs.
    pub async fn open_pool(&self, settings: &PoolSettings) -> Result<AnyPool, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let options = AnyConnectOptions::from_str(&self.connect_url(settings)?)?;
        AnyPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await
    }
}

//! Connection lifecycle: open (direct or through the tunnel) and release.

use crate::config::{Config, DatabaseConfig};
use crate::error::DatabaseError;
use crate::{Error, Result};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use std::time::Duration;
use url::Url;

use super::{Database, SshTunnel};

/// How long to wait for the single pooled connection before giving up
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

impl Database {
    /// Connect to the row store described by `config`
    ///
    /// When `ssh_tunnel.enabled` is set the tunnel is started first and the
    /// pool connects to its local end. If the pool cannot connect, the tunnel
    /// is torn down before the error is returned.
    pub async fn connect(config: &Config) -> Result<Self> {
        if !config.ssh_tunnel.enabled {
            tracing::info!("Connecting to database directly");
            let url = mysql_url(&config.database, &config.database.host, config.database.port)?;
            let db = Self::connect_url(url.as_str()).await?;
            tracing::info!(
                host = %config.database.host,
                port = config.database.port,
                "Database connection established"
            );
            return Ok(db);
        }

        tracing::info!("Connecting to database through SSH tunnel");
        let tunnel = SshTunnel::open(&config.ssh_tunnel).await?;
        let url = mysql_url(&config.database, "127.0.0.1", tunnel.local_port())?;

        match Self::connect_url(url.as_str()).await {
            Ok(mut db) => {
                db.tunnel = Some(tunnel);
                tracing::info!("Database connection through SSH tunnel established");
                Ok(db)
            }
            Err(e) => {
                tunnel.close().await;
                Err(e)
            }
        }
    }

    /// Connect to any sqlx-supported URL (`mysql://…`, `sqlite::memory:`)
    ///
    /// The pool holds at most one connection; the run is strictly sequential.
    pub async fn connect_url(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await
            .map_err(|e| Error::Database(DatabaseError::ConnectionFailed(e.to_string())))?;

        Ok(Self { pool, tunnel: None })
    }

    /// Release the connection and, if present, the tunnel
    ///
    /// Consumes the handle so the release happens exactly once.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database connection closed");

        if let Some(tunnel) = self.tunnel {
            tunnel.close().await;
        }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

/// Build a `mysql://` URL with credentials percent-encoded
pub(crate) fn mysql_url(db: &DatabaseConfig, host: &str, port: u16) -> Result<Url> {
    let invalid = |key: &str| Error::config(format!("database.{key}"), "cannot be encoded in a URL");

    let mut url = Url::parse("mysql://localhost").map_err(|e| Error::Other(e.to_string()))?;
    url.set_host(Some(host)).map_err(|_| invalid("host"))?;
    url.set_port(Some(port)).map_err(|_| invalid("port"))?;
    url.set_username(&db.user).map_err(|_| invalid("user"))?;
    if !db.password.is_empty() {
        url.set_password(Some(&db.password))
            .map_err(|_| invalid("password"))?;
    }
    url.set_path(&db.database);
    Ok(url)
}

//! Configuration types for franchise-logo-dl
//!
//! The download job reads a single JSON file at startup. Only the keys of a
//! production `config.json` are required; everything else has a default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Row store connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host (ignored when the SSH tunnel is enabled)
    pub host: String,

    /// Database port (default: 3306)
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database user
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Schema name
    pub database: String,
}

/// SSH port-forward settings used to reach the row store indirectly
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SshTunnelConfig {
    /// Route the database connection through an SSH tunnel
    #[serde(default)]
    pub enabled: bool,

    /// SSH host
    #[serde(default)]
    pub ssh_host: String,

    /// SSH port (default: 22)
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,

    /// SSH user
    #[serde(default)]
    pub ssh_user: String,

    /// Private key used for authentication
    #[serde(default)]
    pub ssh_key_path: PathBuf,

    /// Database address as seen from the SSH host
    #[serde(default = "default_remote_bind_address")]
    pub remote_bind_address: String,

    /// Database port as seen from the SSH host
    #[serde(default = "default_db_port")]
    pub remote_bind_port: u16,

    /// How long to wait for the forwarded port to accept connections (default: 10 seconds)
    #[serde(default = "default_tunnel_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for SshTunnelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ssh_host: String::new(),
            ssh_port: default_ssh_port(),
            ssh_user: String::new(),
            ssh_key_path: PathBuf::new(),
            remote_bind_address: default_remote_bind_address(),
            remote_bind_port: default_db_port(),
            connect_timeout: default_tunnel_timeout(),
        }
    }
}

/// Retry configuration for transient fetch failures
///
/// `max_attempts` counts retries after the first attempt, so the default of 0
/// performs exactly one request per row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for the download job
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Row store connection
    pub database: DatabaseConfig,

    /// Optional SSH tunnel in front of the row store
    #[serde(default)]
    pub ssh_tunnel: SshTunnelConfig,

    /// Base URL that stored image paths are appended to
    pub s3_base_url: String,

    /// Rows per page (default: 100)
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Directory downloaded images are written to (default: "./downloaded_images")
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Log file every event is appended to (default: "./download.log")
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Timeout for a single image request (default: 30 seconds)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download_timeout: Duration,

    /// User-Agent header sent with image requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Log progress every N rows within a batch (default: 50)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Retry policy for image requests (default: single attempt)
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Read and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::config("batch_size", "must be greater than zero"));
        }
        if self.s3_base_url.trim().is_empty() {
            return Err(Error::config("s3_base_url", "must not be empty"));
        }
        if self.progress_interval == 0 {
            return Err(Error::config(
                "progress_interval",
                "must be greater than zero",
            ));
        }
        if self.ssh_tunnel.enabled {
            if self.ssh_tunnel.ssh_host.trim().is_empty() {
                return Err(Error::config(
                    "ssh_tunnel.ssh_host",
                    "required when the tunnel is enabled",
                ));
            }
            if self.ssh_tunnel.ssh_user.trim().is_empty() {
                return Err(Error::config(
                    "ssh_tunnel.ssh_user",
                    "required when the tunnel is enabled",
                ));
            }
            if self.ssh_tunnel.ssh_key_path.as_os_str().is_empty() {
                return Err(Error::config(
                    "ssh_tunnel.ssh_key_path",
                    "required when the tunnel is enabled",
                ));
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_db_port() -> u16 {
    3306
}

fn default_ssh_port() -> u16 {
    22
}

fn default_remote_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_tunnel_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_batch_size() -> u64 {
    100
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("downloaded_images")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("download.log")
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_progress_interval() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

//! SSH port-forward in front of the row store
//!
//! Runs the system `ssh` client as a child process with a local forward
//! (`-L 127.0.0.1:<local>:<remote_addr>:<remote_port>`). The child is killed on
//! [`SshTunnel::close`] and, as a last resort, when the handle is dropped.

use crate::config::SshTunnelConfig;
use crate::error::DatabaseError;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::Instant;

/// Interval between readiness probes of the forwarded port
const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// A running SSH port-forward
#[derive(Debug)]
pub struct SshTunnel {
    child: Child,
    local_port: u16,
}

impl SshTunnel {
    /// Start the tunnel and wait until the forwarded port accepts connections
    pub async fn open(config: &SshTunnelConfig) -> Result<Self> {
        let ssh = which::which("ssh").map_err(|e| {
            Error::Database(DatabaseError::TunnelFailed(format!(
                "ssh binary not found in PATH: {}",
                e
            )))
        })?;
        Self::open_with_binary(ssh, config).await
    }

    /// Start the tunnel with an explicit `ssh` binary
    pub async fn open_with_binary(ssh: PathBuf, config: &SshTunnelConfig) -> Result<Self> {
        let local_port = free_local_port()?;

        tracing::debug!(
            ssh = %ssh.display(),
            host = %config.ssh_host,
            local_port,
            "starting SSH tunnel"
        );

        let child = Command::new(&ssh)
            .args(forward_args(config, local_port))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Database(DatabaseError::TunnelFailed(format!(
                    "failed to execute {}: {}",
                    ssh.display(),
                    e
                )))
            })?;

        let mut tunnel = Self { child, local_port };
        tunnel.wait_ready(config.connect_timeout).await?;

        tracing::info!(
            host = %config.ssh_host,
            local_port,
            "SSH tunnel established"
        );
        Ok(tunnel)
    }

    /// Local port the database should be reached on
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Stop the tunnel
    pub async fn close(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "failed to stop ssh process");
        }
        tracing::info!("SSH tunnel closed");
    }

    async fn wait_ready(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(status) = self.child.try_wait()? {
                let stderr = self.drain_stderr().await;
                return Err(Error::Database(DatabaseError::TunnelFailed(format!(
                    "ssh exited with {}: {}",
                    status,
                    stderr.trim()
                ))));
            }

            if TcpStream::connect(("127.0.0.1", self.local_port))
                .await
                .is_ok()
            {
                return Ok(());
            }

            if Instant::now() >= deadline {
                if let Err(e) = self.child.kill().await {
                    tracing::warn!(error = %e, "failed to stop ssh process");
                }
                return Err(Error::Database(DatabaseError::TunnelFailed(format!(
                    "forwarded port {} not ready after {:?}",
                    self.local_port, timeout
                ))));
            }

            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    async fn drain_stderr(&mut self) -> String {
        let mut output = String::new();
        if let Some(mut stderr) = self.child.stderr.take() {
            let _ = stderr.read_to_string(&mut output).await;
        }
        output
    }
}

/// Arguments for a non-interactive `ssh` local forward
pub(crate) fn forward_args(config: &SshTunnelConfig, local_port: u16) -> Vec<OsString> {
    let forward = format!(
        "127.0.0.1:{}:{}:{}",
        local_port, config.remote_bind_address, config.remote_bind_port
    );
    let destination = format!("{}@{}", config.ssh_user, config.ssh_host);

    let mut args: Vec<OsString> = vec![
        "-N".into(),
        "-o".into(),
        "BatchMode=yes".into(),
        "-o".into(),
        "ExitOnForwardFailure=yes".into(),
        "-o".into(),
        "StrictHostKeyChecking=accept-new".into(),
        "-p".into(),
        config.ssh_port.to_string().into(),
        "-L".into(),
        forward.into(),
    ];
    if !config.ssh_key_path.as_os_str().is_empty() {
        args.push("-i".into());
        args.push(config.ssh_key_path.clone().into_os_string());
    }
    args.push(destination.into());
    args
}

/// Ask the OS for an unused loopback port
fn free_local_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

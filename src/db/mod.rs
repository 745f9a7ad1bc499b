//! Database layer for franchise-logo-dl
//!
//! Reads the `FRANCHISEE` row store through the sqlx `Any` driver: MySQL in
//! production, SQLite in tests.
//!
//! ## Submodules
//!
//! - [`connection`] - Connection lifecycle (direct or tunneled) and release
//! - [`franchisee`] - Count and page queries against `FRANCHISEE`
//! - [`tunnel`] - SSH port-forward driven through the system `ssh` binary

use crate::Result;
use crate::types::FranchiseeRow;
use async_trait::async_trait;
use sqlx::AnyPool;

mod connection;
mod franchisee;
pub mod tunnel;

pub use tunnel::SshTunnel;

/// Source of rows to download
///
/// Implemented by [`Database`]; tests substitute in-memory sources.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Count rows that are active and carry a non-blank image path
    async fn count_active(&self) -> Result<u64>;

    /// Fetch at most `limit` matching rows starting at `offset`
    ///
    /// Order is the store's natural order; pages are not stable if the table
    /// changes during the run.
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<FranchiseeRow>>;
}

/// Database handle for franchise-logo-dl
///
/// Owns the single-connection pool and, when configured, the SSH tunnel the
/// pool connects through. Both are released by [`Database::close`].
pub struct Database {
    pool: AnyPool,
    tunnel: Option<SshTunnel>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("tunneled", &self.tunnel.is_some())
            .finish()
    }
}

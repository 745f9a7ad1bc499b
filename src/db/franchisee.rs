//! Count and page queries against `FRANCHISEE`.

use crate::error::DatabaseError;
use crate::types::FranchiseeRow;
use crate::{Error, Result};
use async_trait::async_trait;

use super::{Database, RowSource};

// `FR_ID` is cast to text so numeric and string identifiers decode the same way
// on MySQL and SQLite.
const COUNT_ACTIVE: &str = r#"
    SELECT COUNT(*) AS total_count
    FROM FRANCHISEE AS f
    WHERE f.`STATUS` = 'A'
        AND f.logoImageUrl IS NOT NULL
        AND TRIM(f.logoImageUrl) <> ''
"#;

const FETCH_PAGE: &str = r#"
    SELECT CAST(f.FR_ID AS CHAR) AS id, f.FR_NM AS name, f.logoImageUrl AS image_path
    FROM FRANCHISEE AS f
    WHERE f.`STATUS` = 'A'
        AND f.logoImageUrl IS NOT NULL
        AND TRIM(f.logoImageUrl) <> ''
    LIMIT ? OFFSET ?
"#;

#[async_trait]
impl RowSource for Database {
    async fn count_active(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(COUNT_ACTIVE)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "count of active rows failed: {}",
                    e
                )))
            })?;

        u64::try_from(count).map_err(|_| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "count query returned a negative total: {}",
                count
            )))
        })
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<FranchiseeRow>> {
        let to_i64 = |value: u64, what: &str| {
            i64::try_from(value).map_err(|_| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "{} {} does not fit a SQL integer",
                    what, value
                )))
            })
        };

        sqlx::query_as::<_, FranchiseeRow>(FETCH_PAGE)
            .bind(to_i64(limit, "limit")?)
            .bind(to_i64(offset, "offset")?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "page fetch at offset {} failed: {}",
                    offset, e
                )))
            })
    }
}

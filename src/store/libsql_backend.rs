//! libSQL backend: async `AlertStore` implementation.
//!
//! Supports local file and in-memory databases. Expired rows are treated
//! as absent by every read and by the conditional insert, so TTL semantics
//! hold between `evict_expired` sweeps.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::alerts::{AlertRecord, TradeType};
use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::AlertStore;

const ALERT_COLUMNS: &str = "ticker_symbol, trade_type, added_timestamp, expiration_time";

/// libSQL alert store.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    // Keeps the database handle alive for as long as `conn` is in use.
    _db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        migrations::run_migrations(backend.conn()).await?;
        info!(path = %path.display(), "Alert store opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to create in-memory database: {e}")))?;

        let backend = Self::from_database(db)?;
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            _db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Map a libsql Row to an AlertRecord.
///
/// Column order matches ALERT_COLUMNS.
fn row_to_alert(row: &libsql::Row) -> Result<AlertRecord, StoreError> {
    let ticker_symbol: String = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("row ticker_symbol: {e}")))?;
    let trade_type: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("row trade_type: {e}")))?;
    let added_timestamp: i64 = row
        .get(2)
        .map_err(|e| StoreError::Query(format!("row added_timestamp: {e}")))?;
    let expiration_time: i64 = row
        .get(3)
        .map_err(|e| StoreError::Query(format!("row expiration_time: {e}")))?;

    Ok(AlertRecord {
        ticker_symbol,
        trade_type: trade_type.parse::<TradeType>().map_err(StoreError::Query)?,
        added_timestamp,
        expiration_time,
    })
}

#[async_trait]
impl AlertStore for LibSqlBackend {
    async fn put_if_absent(&self, record: &AlertRecord) -> Result<(), StoreError> {
        // An existing row only yields to the new one when it has expired.
        let changed = self
            .conn()
            .execute(
                &format!(
                    "INSERT INTO ticker_alerts ({ALERT_COLUMNS}) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(ticker_symbol) DO UPDATE SET
                        trade_type = excluded.trade_type,
                        added_timestamp = excluded.added_timestamp,
                        expiration_time = excluded.expiration_time
                     WHERE ticker_alerts.expiration_time <= excluded.added_timestamp"
                ),
                params![
                    record.ticker_symbol.as_str(),
                    record.trade_type.as_str(),
                    record.added_timestamp,
                    record.expiration_time,
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("put_if_absent: {e}")))?;

        if changed == 0 {
            return Err(StoreError::AlreadyExists {
                key: record.ticker_symbol.clone(),
            });
        }

        debug!(ticker = %record.ticker_symbol, "Alert inserted into store");
        Ok(())
    }

    async fn get_alert(
        &self,
        ticker_symbol: &str,
        now: i64,
    ) -> Result<Option<AlertRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {ALERT_COLUMNS} FROM ticker_alerts
                     WHERE ticker_symbol = ?1 AND expiration_time > ?2"
                ),
                params![ticker_symbol, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("get_alert: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("get_alert: {e}")))?
        {
            Some(row) => Ok(Some(row_to_alert(&row)?)),
            None => Ok(None),
        }
    }

    async fn active_alerts(&self, now: i64) -> Result<Vec<AlertRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {ALERT_COLUMNS} FROM ticker_alerts
                     WHERE expiration_time > ?1 ORDER BY ticker_symbol"
                ),
                params![now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("active_alerts: {e}")))?;

        let mut alerts = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("active_alerts: {e}")))?
        {
            alerts.push(row_to_alert(&row)?);
        }
        Ok(alerts)
    }

    async fn evict_expired(&self, now: i64) -> Result<usize, StoreError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM ticker_alerts WHERE expiration_time <= ?1",
                params![now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("evict_expired: {e}")))?;

        if count > 0 {
            info!(count, "Evicted expired alerts from store");
        }
        Ok(count as usize)
    }
}

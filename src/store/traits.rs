//! `AlertStore` trait: async interface to the key-value alert table.

use async_trait::async_trait;

use crate::alerts::AlertRecord;
use crate::error::StoreError;

/// Key-value store of active alerts, keyed by ticker symbol.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Insert `record` only if no live record holds its ticker.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the key is taken.
    async fn put_if_absent(&self, record: &AlertRecord) -> Result<(), StoreError>;

    /// Look up the live record for a ticker, if any.
    ///
    /// Read side used by inspection and tests; the triage run only writes.
    async fn get_alert(&self, ticker_symbol: &str, now: i64)
    -> Result<Option<AlertRecord>, StoreError>;

    /// All live records, ordered by ticker.
    ///
    /// Read side used by inspection and tests.
    async fn active_alerts(&self, now: i64) -> Result<Vec<AlertRecord>, StoreError>;

    /// Delete records whose expiration time has passed.
    /// Returns the number of records evicted.
    async fn evict_expired(&self, now: i64) -> Result<usize, StoreError>;
}

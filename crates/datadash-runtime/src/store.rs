use async_trait::async_trait;
use datadash_core::{Query, Record, Result, Schema};
use serde_json::Value;

/// A backend holding the rows of one table.
///
/// Stores evaluate a [`Query`] in this order: equality filter, text search,
/// ordering, offset, limit. Field names in the query have already been
/// checked against [`DataStore::schema`] by the caller. When the query has
/// no ordering, rows come back in the store's natural order.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Name used in log events.
    fn name(&self) -> &str;

    fn schema(&self) -> &Schema;

    /// Field that identifies a single row.
    fn lookup_field(&self) -> &str;

    /// Rows matching `query`, windowed and ordered.
    async fn fetch(&self, query: &Query) -> Result<Vec<Record>>;

    /// Number of rows matching the filter and search of `query`.
    /// Ordering and window are ignored.
    async fn count(&self, query: &Query) -> Result<usize>;

    /// Insert a complete row and return it as stored.
    async fn insert(&self, record: Record) -> Result<Record>;

    /// Apply `changes` to the row whose lookup field equals `key`.
    /// Returns `None` when no such row exists.
    async fn update(&self, key: &Value, changes: Record) -> Result<Option<Record>>;

    /// Remove the row whose lookup field equals `key`.
    /// Returns whether a row was removed.
    async fn delete(&self, key: &Value) -> Result<bool>;
}

//! Single rows handed out by a [`DataSource`](crate::DataSource).

use crate::store::DataStore;
use datadash_core::{Record, Result, StoreError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One row together with the store it came from.
#[derive(Clone)]
pub struct DataItem {
    store: Arc<dyn DataStore>,
    record: Record,
}

impl DataItem {
    pub(crate) fn new(store: Arc<dyn DataStore>, record: Record) -> Self {
        Self { store, record }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    /// Value of the lookup field.
    pub fn key(&self) -> Option<&Value> {
        self.record.get(self.store.lookup_field())
    }

    fn require_key(&self) -> Result<Value> {
        self.key().cloned().ok_or_else(|| {
            StoreError::Query(format!(
                "row in '{}' has no '{}' value",
                self.store.name(),
                self.store.lookup_field()
            ))
            .into()
        })
    }

    /// Write `changes` to the store, then mirror the stored row locally.
    pub async fn update(&mut self, changes: Record) -> Result<()> {
        for field in changes.keys() {
            self.store.schema().check_field(field)?;
        }
        let key = self.require_key()?;
        match self.store.update(&key, changes).await? {
            Some(stored) => {
                self.record = stored;
                Ok(())
            }
            None => Err(StoreError::Conflict(format!(
                "row {key} was removed from '{}'",
                self.store.name()
            ))
            .into()),
        }
    }

    /// Remove the row from its store. Returns whether it was still present.
    pub async fn delete(self) -> Result<bool> {
        let key = self.require_key()?;
        self.store.delete(&key).await
    }
}

impl fmt::Debug for DataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataItem")
            .field("store", &self.store.name())
            .field("record", &self.record)
            .finish()
    }
}

//! In-process store.

use crate::store::DataStore;
use async_trait::async_trait;
use datadash_core::search::matches_search;
use datadash_core::value::compare_values;
use datadash_core::{OrderBy, Query, Record, Result, Schema, StoreError, TableConfig};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows kept in a `Vec` behind a lock.
///
/// New rows are inserted at the front, so the natural order is newest
/// first. Sorting is stable: rows that compare equal keep that order unless a
/// tie-break field is set, in which case ties are ordered by it in the same
/// direction as the main column.
pub struct MemoryStore {
    name: String,
    schema: Schema,
    lookup_field: String,
    tie_break: Option<String>,
    rows: RwLock<Vec<Record>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            lookup_field: "pk".to_string(),
            tie_break: None,
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_lookup_field(mut self, field: impl Into<String>) -> Self {
        self.lookup_field = field.into();
        self
    }

    pub fn with_tie_break(mut self, field: Option<String>) -> Self {
        self.tie_break = field;
        self
    }

    /// Load initial rows as if each had been created in turn.
    ///
    /// Identity counters first skip past every explicit value, so generated
    /// identities never collide with seeded ones.
    pub fn with_rows(self, rows: Vec<Record>) -> Result<Self> {
        for row in &rows {
            self.schema.observe(row);
        }
        {
            let mut stored = self.write()?;
            for row in rows {
                let row = self.schema.apply_defaults(row)?;
                if let Some(key) = self.key_of(&row) {
                    self.ensure_unused(&stored, key)?;
                }
                stored.insert(0, row);
            }
        }
        Ok(self)
    }

    /// Build the store for a memory-backed table declaration.
    pub fn from_config(table: &TableConfig) -> Result<Self> {
        Self::new(table.ident.clone(), table.schema())
            .with_lookup_field(table.lookup_field.clone())
            .with_tie_break(table.tie_break.clone())
            .with_rows(table.rows.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Record>>> {
        self.rows.read().map_err(|e| {
            tracing::warn!(table = %self.name, "memory store lock poisoned");
            StoreError::Poisoned(format!("failed to acquire read lock: {e}")).into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Record>>> {
        self.rows.write().map_err(|e| {
            tracing::warn!(table = %self.name, "memory store lock poisoned");
            StoreError::Poisoned(format!("failed to acquire write lock: {e}")).into()
        })
    }

    fn key_of<'a>(&self, row: &'a Record) -> Option<&'a Value> {
        row.get(&self.lookup_field)
    }

    fn ensure_unused(&self, rows: &[Record], key: &Value) -> Result<()> {
        if rows
            .iter()
            .any(|row| self.key_of(row).is_some_and(|k| same_value(k, key)))
        {
            return Err(StoreError::Conflict(format!(
                "'{}' already has a row with {} = {key}",
                self.name, self.lookup_field
            ))
            .into());
        }
        Ok(())
    }

    fn compare(&self, a: &Record, b: &Record, order: &OrderBy) -> Ordering {
        let by_column = compare_field(a, b, &order.column);
        let ordering = match &self.tie_break {
            Some(tie) if tie != &order.column => by_column.then_with(|| compare_field(a, b, tie)),
            _ => by_column,
        };
        if order.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    compare_values(
        a.get(field).unwrap_or(&Value::Null),
        b.get(field).unwrap_or(&Value::Null),
    )
}

fn same_value(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}

fn matches_filter(row: &Record, criteria: Option<&Record>) -> bool {
    criteria.is_none_or(|criteria| {
        criteria
            .iter()
            .all(|(field, expected)| same_value(row.get(field).unwrap_or(&Value::Null), expected))
    })
}

fn matches_query(row: &Record, query: &Query) -> bool {
    matches_filter(row, query.filter_criteria())
        && query
            .effective_search()
            .is_none_or(|term| matches_search(row, term))
}

#[async_trait]
impl DataStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn lookup_field(&self) -> &str {
        &self.lookup_field
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Record>> {
        let mut matched: Vec<Record> = {
            let rows = self.read()?;
            rows.iter()
                .filter(|row| matches_query(row, query))
                .cloned()
                .collect()
        };

        if let Some(order) = query.ordering() {
            matched.sort_by(|a, b| self.compare(a, b, order));
        }

        let window = matched.into_iter().skip(query.offset_value().unwrap_or(0));
        Ok(match query.limit_value() {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    async fn count(&self, query: &Query) -> Result<usize> {
        let rows = self.read()?;
        Ok(rows.iter().filter(|row| matches_query(row, query)).count())
    }

    async fn insert(&self, record: Record) -> Result<Record> {
        let mut rows = self.write()?;
        if let Some(key) = self.key_of(&record) {
            self.ensure_unused(&rows, key)?;
        }
        self.schema.observe(&record);
        rows.insert(0, record.clone());
        tracing::debug!(table = %self.name, key = ?self.key_of(&record), "row inserted");
        Ok(record)
    }

    async fn update(&self, key: &Value, changes: Record) -> Result<Option<Record>> {
        let mut rows = self.write()?;

        if let Some(new_key) = changes.get(&self.lookup_field)
            && !same_value(new_key, key)
        {
            self.ensure_unused(&rows, new_key)?;
        }

        let Some(row) = rows
            .iter_mut()
            .find(|row| row.get(&self.lookup_field).is_some_and(|k| same_value(k, key)))
        else {
            return Ok(None);
        };
        for (field, value) in changes {
            row.insert(field, value);
        }
        self.schema.observe(row);
        tracing::debug!(table = %self.name, %key, "row updated");
        Ok(Some(row.clone()))
    }

    async fn delete(&self, key: &Value) -> Result<bool> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.retain(|row| !self.key_of(row).is_some_and(|k| same_value(k, key)));
        let removed = rows.len() < before;
        if removed {
            tracing::debug!(table = %self.name, %key, "row deleted");
        }
        Ok(removed)
    }
}

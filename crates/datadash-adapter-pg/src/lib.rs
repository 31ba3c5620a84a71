//! Postgres-backed [`DataStore`].
//!
//! Rows are read back as `to_jsonb(t)` so every column type maps onto a JSON
//! value without per-type decoding.

use async_trait::async_trait;
use datadash_core::{
    DatabaseConfig, FieldDefault, FieldKind, Query, Record, Result, Schema, StoreError,
    TableConfig,
};
use datadash_runtime::DataStore;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Arguments, PgPool, Row};
use std::time::Duration;

pub mod introspect;
pub mod sql;

use sql::{Bind, PgTable, Statement};

fn args_add<T>(args: &mut PgArguments, v: T) -> Result<(), StoreError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v)
        .map_err(|e| StoreError::Query(format!("failed to bind parameter: {e}")))
}

fn arguments(binds: Vec<Bind>) -> Result<PgArguments, StoreError> {
    let mut args = PgArguments::default();
    for bind in binds {
        match bind {
            Bind::Int(v) => args_add(&mut args, v)?,
            Bind::Float(v) => args_add(&mut args, v)?,
            Bind::Bool(v) => args_add(&mut args, v)?,
            Bind::Text(v) => args_add(&mut args, v)?,
            Bind::Timestamp(v) => args_add(&mut args, v)?,
            Bind::Null(kind) => match kind {
                FieldKind::Integer => args_add(&mut args, Option::<i64>::None)?,
                FieldKind::Float => args_add(&mut args, Option::<f64>::None)?,
                FieldKind::Boolean => args_add(&mut args, Option::<bool>::None)?,
                FieldKind::Datetime => {
                    args_add(&mut args, Option::<chrono::DateTime<chrono::Utc>>::None)?
                }
                FieldKind::String | FieldKind::Text => args_add(&mut args, Option::<String>::None)?,
            },
        }
    }
    Ok(args)
}

/// Map a driver error onto the store taxonomy.
pub fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

/// Open the shared connection pool described by the `database` section.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    tracing::info!(database = %config.redacted(), "connecting to postgres");
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.connection_string())
        .await
        .map_err(store_error)
}

fn to_record(row: Option<sqlx::postgres::PgRow>) -> Result<Option<Record>, StoreError> {
    let Some(row) = row else {
        return Ok(None);
    };
    match row.try_get::<Value, _>("row").map_err(store_error)? {
        Value::Object(record) => Ok(Some(record)),
        other => Err(StoreError::Query(format!("expected a row object, got {other}"))),
    }
}

/// A table in Postgres.
///
/// Identity columns are generated by the database, so auto-increment
/// defaults are dropped from the schema on construction.
pub struct PostgresStore {
    pool: PgPool,
    name: String,
    table: PgTable,
}

impl PostgresStore {
    pub fn new(pool: PgPool, name: impl Into<String>, table: PgTable) -> Self {
        let table = PgTable {
            schema: without_generated_defaults(&table.schema),
            ..table
        };
        Self {
            pool,
            name: name.into(),
            table,
        }
    }

    pub fn from_config(pool: PgPool, config: &TableConfig) -> Self {
        Self::new(
            pool,
            config.ident.clone(),
            PgTable {
                relation: config.table_name().to_string(),
                schema: config.schema(),
                lookup_field: config.lookup_field.clone(),
                tie_break: config.tie_break.clone(),
            },
        )
    }

    async fn fetch_optional(&self, stmt: Statement) -> Result<Option<Record>, StoreError> {
        tracing::trace!(table = %self.name, sql = %stmt.sql, "executing");
        let row = sqlx::query_with(&stmt.sql, arguments(stmt.binds)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.failed(e))?;
        to_record(row)
    }

    fn failed(&self, err: sqlx::Error) -> StoreError {
        let err = store_error(err);
        tracing::warn!(table = %self.name, error = %err, "postgres statement failed");
        err
    }
}

fn without_generated_defaults(schema: &Schema) -> Schema {
    Schema::new(
        schema
            .fields()
            .iter()
            .cloned()
            .map(|mut field| {
                if matches!(field.default, Some(FieldDefault::AutoIncrement(_))) {
                    field.default = None;
                }
                field
            })
            .collect(),
    )
}

#[async_trait]
impl DataStore for PostgresStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.table.schema
    }

    fn lookup_field(&self) -> &str {
        &self.table.lookup_field
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Record>> {
        let stmt = sql::select(&self.table, query)?;
        tracing::trace!(table = %self.name, sql = %stmt.sql, "executing");
        let rows = sqlx::query_with(&stmt.sql, arguments(stmt.binds)?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.failed(e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(record) = to_record(Some(row))? {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn count(&self, query: &Query) -> Result<usize> {
        let stmt = sql::count(&self.table, query)?;
        let row = sqlx::query_with(&stmt.sql, arguments(stmt.binds)?)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.failed(e))?;
        let count: i64 = row.try_get("count").map_err(store_error)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn insert(&self, record: Record) -> Result<Record> {
        let stmt = sql::insert(&self.table, &record)?;
        let stored = self.fetch_optional(stmt).await?.ok_or_else(|| {
            StoreError::Query(format!("insert into '{}' returned no row", self.name))
        })?;
        tracing::debug!(table = %self.name, key = ?stored.get(&self.table.lookup_field), "row inserted");
        Ok(stored)
    }

    async fn update(&self, key: &Value, changes: Record) -> Result<Option<Record>> {
        let stmt = sql::update(&self.table, key, &changes)?;
        let stored = self.fetch_optional(stmt).await?;
        if stored.is_some() {
            tracing::debug!(table = %self.name, %key, "row updated");
        }
        Ok(stored)
    }

    async fn delete(&self, key: &Value) -> Result<bool> {
        let stmt = sql::delete(&self.table, key)?;
        let done = sqlx::query_with(&stmt.sql, arguments(stmt.binds)?)
            .execute(&self.pool)
            .await
            .map_err(|e| self.failed(e))?;
        let removed = done.rows_affected() > 0;
        if removed {
            tracing::debug!(table = %self.name, %key, "row deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadash_core::Field;

    #[test]
    fn test_generated_defaults_are_dropped() {
        let schema = Schema::new(vec![
            Field::new("pk", FieldKind::Integer).auto_increment(),
            Field::new("is_admin", FieldKind::Boolean)
                .default_value(FieldDefault::Value(Value::Bool(false))),
        ]);
        let stripped = without_generated_defaults(&schema);

        assert!(stripped.field("pk").unwrap().default.is_none());
        assert!(stripped.field("is_admin").unwrap().default.is_some());
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            store_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
    }

    #[test]
    fn test_arguments_accept_every_bind() {
        let binds = vec![
            Bind::Int(1),
            Bind::Float(1.5),
            Bind::Bool(true),
            Bind::Text("x".to_string()),
            Bind::Timestamp(chrono::Utc::now()),
            Bind::Null(FieldKind::Datetime),
        ];
        assert!(arguments(binds).is_ok());
    }
}

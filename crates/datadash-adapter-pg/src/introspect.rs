//! Compare configured tables against the live database.

use crate::sql::PgTable;
use crate::store_error;
use datadash_core::{FieldKind, StoreError};
use sqlx::{PgPool, Row};

/// One column as reported by `information_schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// A mismatch between a configured field and the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssue {
    MissingTable,
    MissingColumn(String),
    KindMismatch {
        field: String,
        kind: FieldKind,
        data_type: String,
    },
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaIssue::MissingTable => write!(f, "table does not exist"),
            SchemaIssue::MissingColumn(name) => write!(f, "column '{name}' does not exist"),
            SchemaIssue::KindMismatch {
                field,
                kind,
                data_type,
            } => write!(f, "field '{field}' is {kind:?} but column type is {data_type}"),
        }
    }
}

fn split_relation(relation: &str) -> (&str, &str) {
    relation.split_once('.').unwrap_or(("public", relation))
}

/// Columns of `relation` in ordinal order. Empty when the table is missing.
pub async fn table_columns(pool: &PgPool, relation: &str) -> Result<Vec<ColumnInfo>, StoreError> {
    let (schema, table) = split_relation(relation);
    let rows = sqlx::query(
        r#"
        select column_name, data_type, is_nullable
        from information_schema.columns
        where table_schema = $1 and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(store_error)?;

    Ok(rows
        .into_iter()
        .map(|r| ColumnInfo {
            name: r.get("column_name"),
            data_type: r.get("data_type"),
            nullable: r.get::<String, _>("is_nullable") == "YES",
        })
        .collect())
}

/// Whether a Postgres column type can hold a field of `kind`.
pub fn kind_accepts(kind: FieldKind, data_type: &str) -> bool {
    match kind {
        FieldKind::Integer => matches!(data_type, "smallint" | "integer" | "bigint"),
        FieldKind::Float => matches!(
            data_type,
            "real" | "double precision" | "numeric" | "decimal"
        ),
        FieldKind::Boolean => data_type == "boolean",
        FieldKind::Datetime => data_type.starts_with("timestamp") || data_type == "date",
        // Anything renders as text.
        FieldKind::String | FieldKind::Text => true,
    }
}

/// Check every configured field of `table` against `columns`.
pub fn compare(table: &PgTable, columns: &[ColumnInfo]) -> Vec<SchemaIssue> {
    if columns.is_empty() {
        return vec![SchemaIssue::MissingTable];
    }
    table
        .schema
        .fields()
        .iter()
        .filter_map(|field| match columns.iter().find(|c| c.name == field.name) {
            None => Some(SchemaIssue::MissingColumn(field.name.clone())),
            Some(col) if !kind_accepts(field.kind, &col.data_type) => {
                Some(SchemaIssue::KindMismatch {
                    field: field.name.clone(),
                    kind: field.kind,
                    data_type: col.data_type.clone(),
                })
            }
            Some(_) => None,
        })
        .collect()
}

/// Load the columns of `table` and report mismatches.
pub async fn verify_table(pool: &PgPool, table: &PgTable) -> Result<Vec<SchemaIssue>, StoreError> {
    let columns = table_columns(pool, &table.relation).await?;
    Ok(compare(table, &columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadash_core::{Field, Schema};

    fn column(name: &str, data_type: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: true,
        }
    }

    fn users() -> PgTable {
        PgTable {
            relation: "users".to_string(),
            schema: Schema::new(vec![
                Field::new("pk", FieldKind::Integer),
                Field::new("username", FieldKind::String),
                Field::new("joined", FieldKind::Datetime),
            ]),
            lookup_field: "pk".to_string(),
            tie_break: None,
        }
    }

    #[test]
    fn test_split_relation_defaults_to_public() {
        assert_eq!(split_relation("users"), ("public", "users"));
        assert_eq!(split_relation("crm.users"), ("crm", "users"));
    }

    #[test]
    fn test_compare_reports_missing_and_mismatched() {
        let columns = vec![column("pk", "text"), column("username", "character varying")];
        assert_eq!(
            compare(&users(), &columns),
            vec![
                SchemaIssue::KindMismatch {
                    field: "pk".to_string(),
                    kind: FieldKind::Integer,
                    data_type: "text".to_string(),
                },
                SchemaIssue::MissingColumn("joined".to_string()),
            ]
        );
    }

    #[test]
    fn test_compare_accepts_matching_columns() {
        let columns = vec![
            column("pk", "bigint"),
            column("username", "text"),
            column("joined", "timestamp with time zone"),
        ];
        assert!(compare(&users(), &columns).is_empty());
    }

    #[test]
    fn test_missing_table() {
        assert_eq!(compare(&users(), &[]), vec![SchemaIssue::MissingTable]);
    }
}

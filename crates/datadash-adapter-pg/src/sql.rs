//! SQL generation for table queries.
//!
//! Statements are built as text plus typed bind values so they can be
//! inspected without a database. Identifiers are quoted strictly; values are
//! always bound, never interpolated.

use chrono::{DateTime, Utc};
use datadash_core::{Direction, FieldKind, OrderBy, Query, Record, Schema, StoreError};
use serde_json::Value;

/// A value to bind, already converted to the column's Rust type.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
    Null(FieldKind),
}

/// SQL text and its positional parameters (`$1`, `$2`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<Bind>,
}

/// How one table maps onto a Postgres relation.
#[derive(Debug, Clone)]
pub struct PgTable {
    /// Relation name, optionally schema-qualified (`public.users`).
    pub relation: String,
    pub schema: Schema,
    pub lookup_field: String,
    pub tie_break: Option<String>,
}

pub(crate) fn quote_ident(ident: &str) -> Result<String, StoreError> {
    if ident.is_empty() {
        return Err(StoreError::Query("empty identifier".to_string()));
    }
    if !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::Query(format!("invalid identifier '{ident}'")));
    }
    Ok(format!("\"{ident}\""))
}

/// Quote a possibly schema-qualified relation name.
pub(crate) fn quote_relation(relation: &str) -> Result<String, StoreError> {
    let parts = relation
        .split('.')
        .map(quote_ident)
        .collect::<Result<Vec<_>, _>>()?;
    if parts.len() > 2 {
        return Err(StoreError::Query(format!("invalid relation '{relation}'")));
    }
    Ok(parts.join("."))
}

/// Escape LIKE metacharacters and wrap the term for a substring match.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Convert a JSON value into a bind for a field of `kind`.
pub(crate) fn bind_for(field: &str, kind: FieldKind, value: &Value) -> Result<Bind, StoreError> {
    let mismatch = || StoreError::Query(format!("unexpected value {value} for '{field}'"));
    if value.is_null() {
        return Ok(Bind::Null(kind));
    }
    Ok(match kind {
        FieldKind::Integer => match value {
            Value::Number(n) => Bind::Int(n.as_i64().ok_or_else(mismatch)?),
            Value::String(s) => Bind::Int(s.trim().parse().map_err(|_| mismatch())?),
            _ => return Err(mismatch()),
        },
        FieldKind::Float => match value {
            Value::Number(n) => Bind::Float(n.as_f64().ok_or_else(mismatch)?),
            Value::String(s) => Bind::Float(s.trim().parse().map_err(|_| mismatch())?),
            _ => return Err(mismatch()),
        },
        FieldKind::Boolean => Bind::Bool(value.as_bool().ok_or_else(mismatch)?),
        FieldKind::Datetime => {
            let raw = value.as_str().ok_or_else(mismatch)?;
            let parsed = DateTime::parse_from_rfc3339(raw).map_err(|_| mismatch())?;
            Bind::Timestamp(parsed.with_timezone(&Utc))
        }
        FieldKind::String | FieldKind::Text => match value {
            Value::String(s) => Bind::Text(s.clone()),
            other => Bind::Text(other.to_string()),
        },
    })
}

/// Accumulates placeholders while a statement is assembled.
struct Builder<'a> {
    table: &'a PgTable,
    binds: Vec<Bind>,
}

impl<'a> Builder<'a> {
    fn new(table: &'a PgTable) -> Self {
        Self {
            table,
            binds: Vec::new(),
        }
    }

    fn push(&mut self, bind: Bind) -> String {
        self.binds.push(bind);
        format!("${}", self.binds.len())
    }

    fn push_field(&mut self, field: &str, value: &Value) -> Result<String, StoreError> {
        let kind = self
            .table
            .schema
            .field(field)
            .map(|f| f.kind)
            .ok_or_else(|| StoreError::Query(format!("unknown field '{field}'")))?;
        Ok(self.push(bind_for(field, kind, value)?))
    }

    fn where_clause(&mut self, query: &Query) -> Result<String, StoreError> {
        let mut parts = Vec::new();

        if let Some(criteria) = query.filter_criteria() {
            for (field, value) in criteria {
                let column = quote_ident(field)?;
                if value.is_null() {
                    parts.push(format!("t.{column} IS NULL"));
                } else {
                    let placeholder = self.push_field(field, value)?;
                    parts.push(format!("t.{column} = {placeholder}"));
                }
            }
        }

        if let Some(term) = query.effective_search() {
            let placeholder = self.push(Bind::Text(like_pattern(term)));
            let matches = self
                .table
                .schema
                .fields()
                .iter()
                .map(|f| Ok(format!("t.{}::text ILIKE {placeholder}", quote_ident(&f.name)?)))
                .collect::<Result<Vec<_>, StoreError>>()?;
            if !matches.is_empty() {
                parts.push(format!("({})", matches.join(" OR ")));
            }
        }

        Ok(if parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", parts.join(" AND "))
        })
    }

    fn order_clause(&self, order: Option<&OrderBy>) -> Result<String, StoreError> {
        let lookup = &self.table.lookup_field;
        let Some(order) = order else {
            return Ok(format!(" ORDER BY t.{} DESC", quote_ident(lookup)?));
        };

        let mut keys = vec![sort_key(&order.column, order.direction)?];
        match &self.table.tie_break {
            Some(tie) if *tie != order.column => keys.push(sort_key(tie, order.direction)?),
            _ => {}
        }
        if order.column != *lookup && self.table.tie_break.as_deref() != Some(lookup.as_str()) {
            keys.push(format!("t.{} DESC", quote_ident(lookup)?));
        }
        Ok(format!(" ORDER BY {}", keys.join(", ")))
    }

    fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            binds: self.binds,
        }
    }
}

fn sort_key(column: &str, direction: Direction) -> Result<String, StoreError> {
    let column = quote_ident(column)?;
    Ok(match direction {
        Direction::Ascending => format!("t.{column} ASC NULLS FIRST"),
        Direction::Descending => format!("t.{column} DESC NULLS LAST"),
    })
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// `SELECT` for [`DataStore::fetch`](datadash_runtime::DataStore::fetch).
///
/// Without an ordering rows come newest first by lookup field. With one,
/// ties fall back to the tie-break field and then to the same newest-first
/// order.
pub fn select(table: &PgTable, query: &Query) -> Result<Statement, StoreError> {
    let relation = quote_relation(&table.relation)?;
    let mut b = Builder::new(table);
    let where_sql = b.where_clause(query)?;
    let order_sql = b.order_clause(query.ordering())?;

    let mut sql = format!("SELECT to_jsonb(t) AS row FROM {relation} AS t{where_sql}{order_sql}");
    if let Some(limit) = query.limit_value() {
        let p = b.push(Bind::Int(to_i64(limit)));
        sql.push_str(&format!(" LIMIT {p}"));
    }
    if let Some(offset) = query.offset_value() {
        let p = b.push(Bind::Int(to_i64(offset)));
        sql.push_str(&format!(" OFFSET {p}"));
    }
    Ok(b.finish(sql))
}

pub fn count(table: &PgTable, query: &Query) -> Result<Statement, StoreError> {
    let relation = quote_relation(&table.relation)?;
    let mut b = Builder::new(table);
    let where_sql = b.where_clause(query)?;
    Ok(b.finish(format!(
        "SELECT COUNT(*) AS count FROM {relation} AS t{where_sql}"
    )))
}

pub fn insert(table: &PgTable, record: &Record) -> Result<Statement, StoreError> {
    let relation = quote_relation(&table.relation)?;
    if record.is_empty() {
        return Ok(Statement {
            sql: format!("INSERT INTO {relation} AS t DEFAULT VALUES RETURNING to_jsonb(t) AS row"),
            binds: Vec::new(),
        });
    }

    let mut b = Builder::new(table);
    let mut columns = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());
    for (field, value) in record {
        columns.push(quote_ident(field)?);
        values.push(b.push_field(field, value)?);
    }
    Ok(b.finish(format!(
        "INSERT INTO {relation} AS t ({}) VALUES ({}) RETURNING to_jsonb(t) AS row",
        columns.join(", "),
        values.join(", ")
    )))
}

/// `UPDATE ... RETURNING`. With no changes this reads the row back instead.
pub fn update(table: &PgTable, key: &Value, changes: &Record) -> Result<Statement, StoreError> {
    let relation = quote_relation(&table.relation)?;
    let lookup = quote_ident(&table.lookup_field)?;
    let mut b = Builder::new(table);

    if changes.is_empty() {
        let p = b.push_field(&table.lookup_field, key)?;
        return Ok(b.finish(format!(
            "SELECT to_jsonb(t) AS row FROM {relation} AS t WHERE t.{lookup} = {p}"
        )));
    }

    let mut assignments = Vec::with_capacity(changes.len());
    for (field, value) in changes {
        let p = b.push_field(field, value)?;
        assignments.push(format!("{} = {p}", quote_ident(field)?));
    }
    let key_p = b.push_field(&table.lookup_field, key)?;
    Ok(b.finish(format!(
        "UPDATE {relation} AS t SET {} WHERE t.{lookup} = {key_p} RETURNING to_jsonb(t) AS row",
        assignments.join(", ")
    )))
}

pub fn delete(table: &PgTable, key: &Value) -> Result<Statement, StoreError> {
    let relation = quote_relation(&table.relation)?;
    let lookup = quote_ident(&table.lookup_field)?;
    let mut b = Builder::new(table);
    let p = b.push_field(&table.lookup_field, key)?;
    Ok(b.finish(format!("DELETE FROM {relation} AS t WHERE t.{lookup} = {p}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadash_core::Field;
    use serde_json::json;

    fn users() -> PgTable {
        PgTable {
            relation: "public.users".to_string(),
            schema: Schema::new(vec![
                Field::new("pk", FieldKind::Integer),
                Field::new("username", FieldKind::String),
                Field::new("is_admin", FieldKind::Boolean),
                Field::new("joined", FieldKind::Datetime),
            ]),
            lookup_field: "pk".to_string(),
            tie_break: None,
        }
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_quote_ident_is_strict() {
        assert_eq!(quote_ident("users").unwrap(), "\"users\"");
        assert!(quote_ident("").is_err());
        assert!(quote_ident("users; drop table x").is_err());
        assert!(quote_ident("a\"b").is_err());
        assert_eq!(quote_relation("public.users").unwrap(), "\"public\".\"users\"");
        assert!(quote_relation("a.b.c").is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tom"), "%tom%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_plain_select_uses_natural_order() {
        let stmt = select(&users(), &Query::new()).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT to_jsonb(t) AS row FROM \"public\".\"users\" AS t ORDER BY t.\"pk\" DESC"
        );
        assert!(stmt.binds.is_empty());
    }

    #[test]
    fn test_select_with_everything() {
        let query = Query::new()
            .filter(record(json!({"is_admin": true})))
            .search("tom")
            .order_by(OrderBy::descending("username"))
            .offset(20)
            .limit(10);
        let stmt = select(&users(), &query).unwrap();

        assert_eq!(
            stmt.sql,
            "SELECT to_jsonb(t) AS row FROM \"public\".\"users\" AS t \
             WHERE t.\"is_admin\" = $1 AND (t.\"pk\"::text ILIKE $2 OR t.\"username\"::text ILIKE $2 \
             OR t.\"is_admin\"::text ILIKE $2 OR t.\"joined\"::text ILIKE $2) \
             ORDER BY t.\"username\" DESC NULLS LAST, t.\"pk\" DESC LIMIT $3 OFFSET $4"
        );
        assert_eq!(
            stmt.binds,
            vec![
                Bind::Bool(true),
                Bind::Text("%tom%".to_string()),
                Bind::Int(10),
                Bind::Int(20),
            ]
        );
    }

    #[test]
    fn test_empty_search_adds_no_predicate() {
        let stmt = count(&users(), &Query::new().search("")).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(*) AS count FROM \"public\".\"users\" AS t"
        );
    }

    #[test]
    fn test_tie_break_in_same_direction() {
        let mut table = users();
        table.tie_break = Some("joined".to_string());
        let stmt = select(&table, &Query::new().order_by(OrderBy::ascending("is_admin"))).unwrap();
        assert!(stmt.sql.ends_with(
            "ORDER BY t.\"is_admin\" ASC NULLS FIRST, t.\"joined\" ASC NULLS FIRST, t.\"pk\" DESC"
        ));
    }

    #[test]
    fn test_order_by_lookup_has_no_fallback() {
        let stmt = select(&users(), &Query::new().order_by(OrderBy::ascending("pk"))).unwrap();
        assert!(stmt.sql.ends_with("ORDER BY t.\"pk\" ASC NULLS FIRST"));
    }

    #[test]
    fn test_null_filter_uses_is_null() {
        let stmt = count(&users(), &Query::new().filter(record(json!({"joined": null})))).unwrap();
        assert!(stmt.sql.ends_with("WHERE t.\"joined\" IS NULL"));
        assert!(stmt.binds.is_empty());
    }

    #[test]
    fn test_insert_binds_by_kind() {
        let stmt = insert(
            &users(),
            &record(json!({"joined": "2024-01-02T03:04:05Z", "username": "tom"})),
        )
        .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"public\".\"users\" AS t (\"joined\", \"username\") VALUES ($1, $2) \
             RETURNING to_jsonb(t) AS row"
        );
        assert!(matches!(stmt.binds[0], Bind::Timestamp(_)));
        assert_eq!(stmt.binds[1], Bind::Text("tom".to_string()));
    }

    #[test]
    fn test_insert_without_fields_uses_defaults() {
        let stmt = insert(&users(), &Record::new()).unwrap();
        assert!(stmt.sql.contains("DEFAULT VALUES"));
    }

    #[test]
    fn test_update_and_delete_by_lookup() {
        let stmt = update(&users(), &json!(7), &record(json!({"username": "x"}))).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"public\".\"users\" AS t SET \"username\" = $1 WHERE t.\"pk\" = $2 \
             RETURNING to_jsonb(t) AS row"
        );
        assert_eq!(stmt.binds, vec![Bind::Text("x".to_string()), Bind::Int(7)]);

        let stmt = delete(&users(), &json!("7")).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"public\".\"users\" AS t WHERE t.\"pk\" = $1");
        assert_eq!(stmt.binds, vec![Bind::Int(7)]);
    }

    #[test]
    fn test_bind_rejects_mismatched_values() {
        assert!(bind_for("pk", FieldKind::Integer, &json!("seven")).is_err());
        assert!(bind_for("is_admin", FieldKind::Boolean, &json!("yes")).is_err());
        assert!(bind_for("joined", FieldKind::Datetime, &json!("yesterday")).is_err());
        assert_eq!(
            bind_for("pk", FieldKind::Integer, &Value::Null).unwrap(),
            Bind::Null(FieldKind::Integer)
        );
    }
}

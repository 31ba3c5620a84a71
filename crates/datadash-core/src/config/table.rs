//! Table configuration.
//!
//! Each entry under `tables:` declares one dashboard table: where its rows
//! live, how its fields look, and how it paginates.

use crate::schema::{AutoIncrement, Field, FieldDefault, FieldKind, Record, Schema};
use serde::{Deserialize, Serialize};

/// Which store backs a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Rows live in process memory.
    #[default]
    Memory,
    /// Rows live in a Postgres table.
    Postgres,
}

/// Declaration of one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// URL identifier (`/{ident}`).
    pub ident: String,

    /// Display title. Defaults to the identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub backend: BackendKind,

    /// Postgres table name, optionally schema-qualified. Defaults to the identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Rows per page. Falls back to the dashboard default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,

    /// Field used to address single rows in URLs.
    #[serde(default = "default_lookup_field")]
    pub lookup_field: String,

    /// Secondary sort key applied to ties when ordering by a column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<String>,

    pub fields: Vec<FieldConfig>,

    /// Initial rows for memory-backed tables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Record>,
}

/// Declaration of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub kind: FieldKind,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultConfig>,
}

/// Declared default for a field.
///
/// ```yaml
/// default: auto_increment
/// default: now
/// default: { value: false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultConfig {
    AutoIncrement,
    Now,
    Value(serde_json::Value),
}

impl TableConfig {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.ident)
    }

    /// The Postgres relation name.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.ident)
    }

    /// Build the runtime schema.
    ///
    /// Every call creates fresh identity counters, so two schemas built from
    /// the same configuration never share state.
    pub fn schema(&self) -> Schema {
        Schema::new(self.fields.iter().map(FieldConfig::to_field).collect())
    }
}

impl FieldConfig {
    fn to_field(&self) -> Field {
        let mut field = Field::new(&self.name, self.kind);
        if let Some(title) = &self.title {
            field = field.title(title);
        }
        field.read_only = self.read_only;
        field.required = self.required;
        field.max_length = self.max_length;
        field.default = self.default.as_ref().map(|d| match d {
            DefaultConfig::AutoIncrement => FieldDefault::AutoIncrement(AutoIncrement::new()),
            DefaultConfig::Now => FieldDefault::Now,
            DefaultConfig::Value(v) => FieldDefault::Value(v.clone()),
        });
        field
    }
}

fn default_lookup_field() -> String {
    "pk".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = r#"
ident: users
title: Users
fields:
  - name: pk
    title: Identity
    kind: integer
    read_only: true
    default: auto_increment
  - name: username
    max_length: 100
    required: true
  - name: is_admin
    kind: boolean
    default:
      value: false
  - name: joined
    kind: datetime
    default: now
"#;

    #[test]
    fn test_parse_table() {
        let table: TableConfig = serde_yaml::from_str(USERS).unwrap();
        assert_eq!(table.title(), "Users");
        assert_eq!(table.table_name(), "users");
        assert_eq!(table.lookup_field, "pk");
        assert_eq!(table.backend, BackendKind::Memory);
        assert_eq!(table.fields.len(), 4);
        assert_eq!(table.fields[0].default, Some(DefaultConfig::AutoIncrement));
        assert_eq!(
            table.fields[2].default,
            Some(DefaultConfig::Value(serde_json::json!(false)))
        );
        assert_eq!(table.fields[1].kind, FieldKind::String);
    }

    #[test]
    fn test_schemas_do_not_share_counters() {
        let table: TableConfig = serde_yaml::from_str(USERS).unwrap();
        let a = table.schema();
        let b = table.schema();

        let first = a.apply_defaults(Record::new()).unwrap();
        let second = a.apply_defaults(Record::new()).unwrap();
        let other = b.apply_defaults(Record::new()).unwrap();

        assert_eq!(first["pk"], 0);
        assert_eq!(second["pk"], 1);
        assert_eq!(other["pk"], 0);
        assert!(first["joined"].is_string());
    }
}

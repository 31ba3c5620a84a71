//! Table schema metadata.
//!
//! A [`Schema`] is the ordered list of fields a table exposes. The query
//! pipeline uses it to reject unknown field references and to fill in
//! defaults on create; the dashboard uses it to derive column titles and
//! form inputs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// One row: field name to value.
pub type Record = serde_json::Map<String, Value>;

/// The storage kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Float,
    #[default]
    String,
    Text,
    Boolean,
    Datetime,
}

/// Stateful identity generator.
///
/// Yields a strictly increasing sequence starting at 0 (or at the value given
/// to [`AutoIncrement::starting_at`]). Values are never handed out twice, even
/// after the rows that carried them are deleted. Clones share the same
/// counter; separately constructed generators are independent.
#[derive(Debug, Clone, Default)]
pub struct AutoIncrement {
    next: Arc<AtomicI64>,
}

impl AutoIncrement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: i64) -> Self {
        Self {
            next: Arc::new(AtomicI64::new(start)),
        }
    }

    /// Take the next identity.
    pub fn next_value(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Advance past an identity that already exists in the store.
    pub fn observe(&self, existing: i64) {
        self.next.fetch_max(existing.saturating_add(1), Ordering::SeqCst);
    }

    /// The value the next call to [`AutoIncrement::next_value`] will return.
    pub fn peek(&self) -> i64 {
        self.next.load(Ordering::SeqCst)
    }
}

/// How a field absent from create input gets its value.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    /// A fixed value.
    Value(Value),
    /// The next value of an identity counter.
    AutoIncrement(AutoIncrement),
    /// The current UTC time, RFC 3339.
    Now,
}

impl FieldDefault {
    pub fn produce(&self) -> Value {
        match self {
            FieldDefault::Value(v) => v.clone(),
            FieldDefault::AutoIncrement(counter) => Value::from(counter.next_value()),
            FieldDefault::Now => Value::String(chrono::Utc::now().to_rfc3339()),
        }
    }
}

/// A single declared field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub title: String,
    pub kind: FieldKind,
    /// Not editable through forms.
    pub read_only: bool,
    /// Forms must supply a non-empty value.
    pub required: bool,
    /// Maximum character count for string fields.
    pub max_length: Option<usize>,
    pub default: Option<FieldDefault>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            title: title_from_name(&name),
            name,
            kind,
            read_only: false,
            required: false,
            max_length: None,
            default: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn default_value(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Shorthand for an auto-incrementing identity field.
    pub fn auto_increment(self) -> Self {
        self.default_value(FieldDefault::AutoIncrement(AutoIncrement::new()))
    }
}

/// "is_admin" -> "Is admin"
fn title_from_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ordered field metadata for one table.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fail with [`Error::InvalidField`] unless `name` is declared.
    pub fn check_field(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(Error::invalid_field(name))
        }
    }

    /// Column id to display title, in declaration order.
    pub fn columns(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.title.clone()))
            .collect()
    }

    /// Complete create input with declared defaults.
    ///
    /// Unknown input fields are rejected. Fields that are absent and have no
    /// default stay absent, so the store decides what to put there.
    pub fn apply_defaults(&self, mut input: Record) -> Result<Record> {
        if let Some(unknown) = input.keys().find(|k| !self.contains(k)) {
            return Err(Error::invalid_field(unknown.clone()));
        }
        for field in &self.fields {
            if input.contains_key(&field.name) {
                continue;
            }
            if let Some(default) = &field.default {
                input.insert(field.name.clone(), default.produce());
            }
        }
        Ok(input)
    }

    /// Advance identity counters past the values in an existing row.
    pub fn observe(&self, record: &Record) {
        for field in &self.fields {
            if let Some(FieldDefault::AutoIncrement(counter)) = &field.default
                && let Some(existing) = record.get(&field.name).and_then(Value::as_i64)
            {
                counter.observe(existing);
            }
        }
    }
}

//! Form input coercion.
//!
//! HTML forms submit every value as text. A [`FormValidator`] turns the
//! submitted pairs into a typed [`Record`] or reports per-field errors for
//! the page to show next to the inputs.

use chrono::{DateTime, NaiveDateTime, Utc};
use datadash_core::{Field, FieldKind, Record, Schema};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Field name to error message.
pub type FieldErrors = BTreeMap<String, String>;

/// Submitted form values.
pub type FormData = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Blank optional fields are left out so store defaults apply.
    Create,
    /// Blank optional fields are cleared.
    Update,
}

/// Validates submitted forms against a table schema.
pub trait FormValidator: Send + Sync {
    fn validate(&self, schema: &Schema, form: &FormData, mode: FormMode) -> Result<Record, FieldErrors>;
}

/// Coerces text inputs by field kind.
///
/// Read-only fields are never taken from the form. Booleans are checkboxes,
/// so an absent value means `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl FormValidator for SchemaValidator {
    fn validate(&self, schema: &Schema, form: &FormData, mode: FormMode) -> Result<Record, FieldErrors> {
        let mut record = Record::new();
        let mut errors = FieldErrors::new();

        for field in schema.fields().iter().filter(|f| !f.read_only) {
            let raw = form.get(&field.name).map(|v| v.trim()).unwrap_or("");
            match coerce(field, raw, mode) {
                Ok(Some(value)) => {
                    record.insert(field.name.clone(), value);
                }
                Ok(None) => {}
                Err(message) => {
                    errors.insert(field.name.clone(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn coerce(field: &Field, raw: &str, mode: FormMode) -> Result<Option<Value>, String> {
    if field.kind == FieldKind::Boolean {
        return Ok(Some(Value::Bool(matches!(raw, "on" | "true" | "1"))));
    }

    if raw.is_empty() {
        if field.required {
            return Err("This field is required.".to_string());
        }
        return Ok(match (field.kind, mode) {
            (FieldKind::String | FieldKind::Text, _) => Some(Value::String(String::new())),
            (_, FormMode::Create) => None,
            (_, FormMode::Update) => Some(Value::Null),
        });
    }

    let value = match field.kind {
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "Must be an integer.".to_string())?,
        FieldKind::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| "Must be a number.".to_string())?,
        FieldKind::Datetime => parse_datetime(raw)
            .map(|dt| Value::String(dt.to_rfc3339()))
            .ok_or_else(|| "Must be a date and time.".to_string())?,
        FieldKind::String | FieldKind::Text => {
            if let Some(max) = field.max_length
                && raw.chars().count() > max
            {
                return Err(format!("Must have no more than {max} characters."));
            }
            Value::String(raw.to_string())
        }
        FieldKind::Boolean => Value::Bool(matches!(raw, "on" | "true" | "1")),
    };
    Ok(Some(value))
}

/// RFC 3339, or the `datetime-local` input format read as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Convert a `{ident}` path segment into a lookup value. `None` when the
/// segment cannot name a row of that kind.
pub fn parse_key(field: Option<&Field>, raw: &str) -> Option<Value> {
    match field.map(|f| f.kind) {
        Some(FieldKind::Integer) => raw.parse::<i64>().ok().map(Value::from),
        Some(FieldKind::Float) => raw.parse::<f64>().ok().map(Value::from),
        _ => Some(Value::String(raw.to_string())),
    }
}

/// Render a stored value back into an input's text.
pub fn input_value(field: &Field, value: Option<&Value>) -> String {
    match (field.kind, value) {
        (_, None | Some(Value::Null)) => String::new(),
        (FieldKind::Datetime, Some(Value::String(s))) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%dT%H:%M").to_string())
            .unwrap_or_else(|_| s.clone()),
        (_, Some(v)) => datadash_core::value::display_text(v),
    }
}

//! Helpers over field values.

use serde_json::Value;
use std::cmp::Ordering;

/// Total order over field values used for column sorting.
///
/// Values of different kinds sort null < boolean < number < string < other;
/// arrays and objects compare by their JSON text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => {
            let rank = kind_rank(a).cmp(&kind_rank(b));
            if rank == Ordering::Equal {
                a.to_string().cmp(&b.to_string())
            } else {
                rank
            }
        }
    }
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Plain text for a value: strings unquoted, null empty.
pub fn display_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(compare_values(&json!(-1), &json!(-1)), Ordering::Equal);
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(compare_values(&json!(null), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!(0), &json!(null)), Ordering::Greater);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&json!("tom")), "tom");
        assert_eq!(display_text(&json!(null)), "");
        assert_eq!(display_text(&json!(true)), "true");
        assert_eq!(display_text(&json!(12)), "12");
    }
}

//! Text search over records.

use crate::schema::Record;
use crate::value::display_text;

/// Case-insensitive substring match of `term` against every field of `record`.
/// An empty term matches everything.
pub fn matches_search(record: &Record, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    record
        .values()
        .any(|v| display_text(v).to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(username: &str, is_admin: bool) -> Record {
        let mut r = Record::new();
        r.insert("username".into(), json!(username));
        r.insert("is_admin".into(), json!(is_admin));
        r
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let r = record("Tom@Example.com", false);
        assert!(matches_search(&r, "tom@"));
        assert!(matches_search(&r, "EXAMPLE"));
        assert!(!matches_search(&r, "jane"));
    }

    #[test]
    fn test_search_covers_non_string_fields() {
        assert!(matches_search(&record("tom", true), "true"));
    }

    #[test]
    fn test_empty_search_is_a_no_op() {
        assert!(matches_search(&record("a", true), ""));
        assert!(matches_search(&Record::new(), ""));
    }
}

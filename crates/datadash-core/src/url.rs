//! Request URLs with editable query parameters.
//!
//! Page and column controls link back to the current page with one query
//! parameter changed. [`RequestUrl`] keeps the path and the ordered query
//! pairs and derives those links without touching anything else the host
//! put in the query string.

use std::fmt;
use url::form_urlencoded;

/// A path plus its ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestUrl {
    path: String,
    params: Vec<(String, String)>,
}

impl RequestUrl {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    /// Parse a `path?query` string (as found in a request's URI).
    pub fn parse(path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };
        Self {
            path: path.to_string(),
            params: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, dropping any previous values of `key`.
    /// The parameter moves to the end of the query string.
    pub fn include_query_param(&self, key: &str, value: impl ToString) -> Self {
        let mut params: Vec<(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| k != key)
            .cloned()
            .collect();
        params.push((key.to_string(), value.to_string()));
        Self {
            path: self.path.clone(),
            params,
        }
    }

    /// Drop every value of `key`.
    pub fn remove_query_param(&self, key: &str) -> Self {
        Self {
            path: self.path.clone(),
            params: self
                .params
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }

    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let url = RequestUrl::parse("/users?page=2&search=tom+smith");
        assert_eq!(url.path(), "/users");
        assert_eq!(url.get("page"), Some("2"));
        assert_eq!(url.get("search"), Some("tom smith"));
        assert_eq!(url.to_string(), "/users?page=2&search=tom+smith");
    }

    #[test]
    fn test_include_replaces_and_moves_to_end() {
        let url = RequestUrl::parse("/?page=3&order=name");
        assert_eq!(url.include_query_param("page", 4).to_string(), "/?order=name&page=4");
    }

    #[test]
    fn test_remove_last_param_drops_question_mark() {
        let url = RequestUrl::parse("/?page=3");
        assert_eq!(url.remove_query_param("page").to_string(), "/");
    }

    #[test]
    fn test_remove_missing_param_is_noop() {
        let url = RequestUrl::parse("/admin/users?search=x");
        assert_eq!(url.remove_query_param("page"), url);
    }

    #[test]
    fn test_sign_marker_not_escaped() {
        let url = RequestUrl::new("/").include_query_param("order", "-username");
        assert_eq!(url.to_string(), "/?order=-username");
    }

    #[test]
    fn test_repeated_keys_collapse_on_include() {
        let url = RequestUrl::parse("/?page=1&page=2");
        assert_eq!(url.get("page"), Some("1"));
        assert_eq!(url.include_query_param("page", 5).to_string(), "/?page=5");
    }
}

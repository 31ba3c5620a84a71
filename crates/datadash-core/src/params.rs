//! List-view request parameters.

use crate::ordering::{ORDER_PARAM, parse_ordering};
use crate::pagination::get_page_number;
use crate::query::OrderBy;
use crate::url::RequestUrl;

/// Query parameter carrying the text search.
pub const SEARCH_PARAM: &str = "search";

/// Search term from the query string; blank means no search.
pub fn get_search_term(url: &RequestUrl) -> Option<String> {
    url.get(SEARCH_PARAM)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The `page`, `order` and `search` parameters of a list request.
///
/// Parsing never fails. A malformed page number reads as page 1 and the raw
/// ordering is only trusted once checked against the table's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: i64,
    pub order: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn from_url(url: &RequestUrl) -> Self {
        Self {
            page: get_page_number(url),
            order: url.get(ORDER_PARAM).map(str::to_string),
            search: get_search_term(url),
        }
    }

    pub fn from_query(path_and_query: &str) -> Self {
        Self::from_url(&RequestUrl::parse(path_and_query))
    }

    /// The requested ordering if it names one of `columns`.
    pub fn ordering(&self, columns: &[(String, String)]) -> Option<OrderBy> {
        parse_ordering(self.order.as_deref()?, columns)
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            order: None,
            search: None,
        }
    }
}

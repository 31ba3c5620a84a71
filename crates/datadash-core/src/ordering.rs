//! Column ordering controls.
//!
//! Each column header links to the next state in the cycle
//! unsorted → ascending → descending → unsorted. Every link also drops the
//! page number, so changing the sort starts again from the first page.

use crate::pagination::PAGE_PARAM;
use crate::query::OrderBy;
use crate::url::RequestUrl;
use serde::Serialize;

/// Query parameter carrying the signed ordering.
pub const ORDER_PARAM: &str = "order";

/// One sortable column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnControl {
    pub id: String,
    pub text: String,
    pub url: Option<String>,
    pub is_forward_sorted: bool,
    pub is_reverse_sorted: bool,
}

impl ColumnControl {
    pub fn is_sorted(&self) -> bool {
        self.is_forward_sorted || self.is_reverse_sorted
    }
}

/// Ordering requested by the query string.
///
/// Only declared column ids are accepted; anything else (including a bare
/// `-`) is treated as no ordering.
pub fn get_ordering(url: &RequestUrl, columns: &[(String, String)]) -> Option<OrderBy> {
    parse_ordering(url.get(ORDER_PARAM)?, columns)
}

/// Parse a signed ordering, accepting it only for a declared column.
pub fn parse_ordering(raw: &str, columns: &[(String, String)]) -> Option<OrderBy> {
    let order = OrderBy::parse(raw)?;
    columns
        .iter()
        .any(|(id, _)| *id == order.column)
        .then_some(order)
}

/// Build one control per declared column, in declaration order.
pub fn column_controls(
    url: &RequestUrl,
    columns: &[(String, String)],
    order_by: Option<&OrderBy>,
) -> Vec<ColumnControl> {
    columns
        .iter()
        .map(|(id, title)| {
            let selected = order_by.filter(|o| o.column == *id);
            let linked = match selected {
                None => url.include_query_param(ORDER_PARAM, id),
                Some(o) if !o.is_descending() => url.include_query_param(ORDER_PARAM, o.reversed()),
                Some(_) => url.remove_query_param(ORDER_PARAM),
            }
            .remove_query_param(PAGE_PARAM);

            ColumnControl {
                id: id.clone(),
                text: title.clone(),
                url: Some(linked.to_string()),
                is_forward_sorted: selected.is_some_and(|o| !o.is_descending()),
                is_reverse_sorted: selected.is_some_and(|o| o.is_descending()),
            }
        })
        .collect()
}

//! Core types for the datadash admin dashboard.
//!
//! Everything here is synchronous and free of I/O: the query specification
//! consumed by data stores, table schemas with their field defaults, and the
//! pure functions that turn a request URL into page and column controls.

pub mod config;
pub mod error;
pub mod ordering;
pub mod pagination;
pub mod params;
pub mod query;
pub mod schema;
pub mod search;
pub mod url;
pub mod value;

pub use config::{
    BackendKind, ConfigError, DashboardConfig, DatabaseConfig, DatadashConfig, DefaultConfig,
    FieldConfig, TableConfig,
};
pub use error::{Error, Result, StoreError};
pub use ordering::{ColumnControl, ORDER_PARAM, column_controls, get_ordering, parse_ordering};
pub use pagination::{
    ELLIPSIS, PAGE_PARAM, PageControl, clamp_page, get_page_number, page_controls,
    page_controls_for_url, page_offset, total_pages,
};
pub use params::{ListParams, SEARCH_PARAM, get_search_term};
pub use query::{Direction, OrderBy, Query};
pub use schema::{AutoIncrement, Field, FieldDefault, FieldKind, Record, Schema};
pub use url::RequestUrl;

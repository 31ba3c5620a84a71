//! Dashboard application state.

use crate::forms::{FormValidator, SchemaValidator};
use datadash_core::TableConfig;
use datadash_runtime::DataSource;
use std::sync::Arc;

/// One table exposed by the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardTable {
    /// URL identifier, the `{table}` path segment.
    pub ident: String,
    pub title: String,
    pub source: DataSource,
    pub page_size: usize,
}

impl DashboardTable {
    pub fn new(ident: impl Into<String>, title: impl Into<String>, source: DataSource) -> Self {
        Self {
            ident: ident.into(),
            title: title.into(),
            source,
            page_size: 10,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Wrap an already-built source with the settings of its declaration.
    pub fn from_config(config: &TableConfig, source: DataSource, default_page_size: usize) -> Self {
        Self::new(config.ident.clone(), config.title(), source)
            .with_page_size(config.page_size.unwrap_or(default_page_size))
    }
}

/// Shared application state for the dashboard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Clone)]
struct AppStateInner {
    tables: Vec<DashboardTable>,
    validator: Arc<dyn FormValidator>,
}

impl AppState {
    pub fn new(tables: Vec<DashboardTable>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                tables,
                validator: Arc::new(SchemaValidator),
            }),
        }
    }

    /// Replace the form validator.
    pub fn with_validator(self, validator: Arc<dyn FormValidator>) -> Self {
        let inner = Arc::unwrap_or_clone(self.inner);
        Self {
            inner: Arc::new(AppStateInner { validator, ..inner }),
        }
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> &[DashboardTable] {
        &self.inner.tables
    }

    pub fn table(&self, ident: &str) -> Option<&DashboardTable> {
        self.inner.tables.iter().find(|t| t.ident == ident)
    }

    pub fn validator(&self) -> &dyn FormValidator {
        self.inner.validator.as_ref()
    }
}

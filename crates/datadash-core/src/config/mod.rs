//! Configuration types for the datadash admin dashboard.
//!
//! Configuration is loaded from a single YAML file (conventionally
//! `datadash.yaml`) with three sections:
//!
//! - **dashboard**: where the HTTP server listens and its mount prefix
//! - **database**: Postgres connection, needed only by postgres-backed tables
//! - **tables**: the tables to expose, their fields and pagination settings

pub mod dashboard;
pub mod database;
pub mod table;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub use dashboard::DashboardConfig;
pub use database::DatabaseConfig;
pub use table::{BackendKind, DefaultConfig, FieldConfig, TableConfig};

/// Complete datadash configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatadashConfig {
    /// Dashboard server settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Database connection (required when any table uses the postgres backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,

    /// Tables to expose, in display order.
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DatadashConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Get a table by identifier.
    pub fn get_table(&self, ident: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.ident == ident)
    }

    /// Effective page size for a table.
    pub fn page_size_for(&self, table: &TableConfig) -> usize {
        table.page_size.unwrap_or(self.dashboard.page_size)
    }

    /// Check cross-references that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dashboard.page_size == 0 {
            return Err(ConfigError::Config(
                "dashboard.page_size must be at least 1".to_string(),
            ));
        }

        let base = self.dashboard.normalized_base_path();
        if !base.is_empty() && (!base.starts_with('/') || base.contains(['?', '#', '{', '}'])) {
            return Err(ConfigError::Config(format!(
                "dashboard.base_path '{}' must be a path starting with '/'",
                self.dashboard.base_path
            )));
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.ident.is_empty() || table.ident.contains('/') {
                return Err(ConfigError::Config(format!(
                    "table identifier '{}' must be non-empty and contain no '/'",
                    table.ident
                )));
            }
            if !seen.insert(table.ident.as_str()) {
                return Err(ConfigError::Config(format!(
                    "duplicate table identifier '{}'",
                    table.ident
                )));
            }
            if table.fields.is_empty() {
                return Err(ConfigError::Config(format!(
                    "table '{}' declares no fields",
                    table.ident
                )));
            }

            let mut field_names = HashSet::new();
            for field in &table.fields {
                if !field_names.insert(field.name.as_str()) {
                    return Err(ConfigError::Config(format!(
                        "table '{}' declares field '{}' twice",
                        table.ident, field.name
                    )));
                }
            }
            if !field_names.contains(table.lookup_field.as_str()) {
                return Err(ConfigError::Config(format!(
                    "table '{}' lookup field '{}' is not a declared field",
                    table.ident, table.lookup_field
                )));
            }
            if let Some(tie_break) = &table.tie_break
                && !field_names.contains(tie_break.as_str())
            {
                return Err(ConfigError::Config(format!(
                    "table '{}' tie_break field '{}' is not a declared field",
                    table.ident, tie_break
                )));
            }
            if table.page_size == Some(0) {
                return Err(ConfigError::Config(format!(
                    "table '{}' page_size must be at least 1",
                    table.ident
                )));
            }
            if table.backend == BackendKind::Postgres {
                if self.database.is_none() {
                    return Err(ConfigError::Config(format!(
                        "table '{}' uses the postgres backend but no database is configured",
                        table.ident
                    )));
                }
                if !table.rows.is_empty() {
                    return Err(ConfigError::Config(format!(
                        "table '{}' declares seed rows, which only memory tables accept",
                        table.ident
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether any table needs a database connection.
    pub fn needs_database(&self) -> bool {
        self.tables
            .iter()
            .any(|t| t.backend == BackendKind::Postgres)
    }
}

//! `datadash serve` command implementation.
//!
//! Loads a configuration file, opens the store behind every declared table
//! and serves the dashboard until Ctrl-C.

use anyhow::{Context, Result};
use datadash_adapter_pg::PostgresStore;
use datadash_core::{BackendKind, DatadashConfig};
use datadash_dashboard::{AppState, DashboardServer, DashboardTable};
use datadash_runtime::{DataSource, MemoryStore};
use sqlx::PgPool;
use std::path::Path;

/// Load and validate the configuration, applying command-line overrides.
pub fn load_config(path: &Path, port: Option<u16>) -> Result<DatadashConfig> {
    let mut config = DatadashConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    if let Some(port) = port {
        config.dashboard.port = port;
    }
    Ok(config)
}

/// Build one dashboard table per declaration.
///
/// Postgres tables share `pool`, which must be present when any table uses
/// that backend.
pub fn build_tables(config: &DatadashConfig, pool: Option<&PgPool>) -> Result<Vec<DashboardTable>> {
    config
        .tables
        .iter()
        .map(|table| {
            let source = match table.backend {
                BackendKind::Memory => DataSource::from_store(
                    MemoryStore::from_config(table)
                        .with_context(|| format!("invalid seed rows for table '{}'", table.ident))?,
                ),
                BackendKind::Postgres => {
                    let pool = pool.with_context(|| {
                        format!("table '{}' needs a database connection", table.ident)
                    })?;
                    DataSource::from_store(PostgresStore::from_config(pool.clone(), table))
                }
            };
            Ok(DashboardTable::from_config(
                table,
                source,
                config.page_size_for(table),
            ))
        })
        .collect()
}

pub async fn run(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path, port)?;

    let pool = match &config.database {
        Some(database) if config.needs_database() => Some(
            datadash_adapter_pg::connect(database)
                .await
                .context("database connection failed")?,
        ),
        _ => None,
    };

    let tables = build_tables(&config, pool.as_ref())?;
    tracing::info!(
        config = %config_path.display(),
        tables = tables.len(),
        "configuration loaded"
    );

    DashboardServer::new(config.dashboard, AppState::new(tables))
        .run()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
dashboard:
  port: 9000
  page_size: 25
tables:
  - ident: users
    title: Users
    page_size: 5
    fields:
      - name: pk
        kind: integer
        read_only: true
        default: auto_increment
      - name: username
        required: true
    rows:
      - { username: tom }
      - { username: ann }
  - ident: tags
    fields:
      - name: pk
        kind: integer
"#;

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("datadash.yaml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_config_with_port_override() {
        let (_dir, path) = write_config(CONFIG);
        assert_eq!(load_config(&path, None).unwrap().dashboard.port, 9000);
        assert_eq!(load_config(&path, Some(9100)).unwrap().dashboard.port, 9100);
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let (_dir, path) = write_config("tables:\n  - ident: users\n    fields: []\n");
        let err = load_config(&path, None).unwrap_err();
        assert!(format!("{err:#}").contains("declares no fields"));
    }

    #[tokio::test]
    async fn test_build_memory_tables() {
        let (_dir, path) = write_config(CONFIG);
        let config = load_config(&path, None).unwrap();
        let tables = build_tables(&config, None).unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].title, "Users");
        assert_eq!(tables[0].page_size, 5);
        assert_eq!(tables[1].title, "tags");
        assert_eq!(tables[1].page_size, 25);
        assert_eq!(tables[0].source.count().await.unwrap(), 2);
    }

    #[test]
    fn test_postgres_table_without_pool_fails() {
        let config = DatadashConfig::from_yaml(
            r#"
database: { url: "postgres://localhost/app" }
tables:
  - ident: orders
    backend: postgres
    fields:
      - name: pk
        kind: integer
"#,
        )
        .unwrap();
        let err = build_tables(&config, None).unwrap_err();
        assert!(err.to_string().contains("needs a database connection"));
    }
}

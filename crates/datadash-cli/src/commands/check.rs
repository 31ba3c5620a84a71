//! `datadash check` command implementation.
//!
//! Validates a configuration file:
//! - Structural validation (identifiers, lookup fields, page sizes)
//! - Warnings for declarations that parse but behave surprisingly
//! - With `--connect`, Postgres tables are compared with the live database

use anyhow::{Context, Result};
use datadash_adapter_pg::introspect::verify_table;
use datadash_adapter_pg::sql::PgTable;
use datadash_core::{BackendKind, DatadashConfig, DefaultConfig, FieldKind};
use std::path::Path;

// ============================================================================
// Check Result Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Category of the check that produced this finding.
    pub category: String,
    pub message: String,
    /// Location within the file (e.g. "tables.users").
    pub location: Option<String>,
}

impl CheckFinding {
    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category: category.into(),
            message: message.into(),
            location: None,
        }
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(category, message)
        }
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            ..Self::error(category, message)
        }
    }

    fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn add(&mut self, finding: CheckFinding) {
        self.findings.push(finding);
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        for (severity, heading) in [
            (Severity::Error, "❌ Errors"),
            (Severity::Warning, "⚠️  Warnings"),
            (Severity::Info, "ℹ️  Info"),
        ] {
            let mut group: Vec<_> = self
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            group.sort_by(|a, b| a.category.cmp(&b.category));
            println!("\n{heading} ({}):", group.len());
            println!("{}", "─".repeat(60));
            for finding in group {
                print_finding(finding);
            }
        }

        println!();
        println!("{}", "═".repeat(60));
        if self.error_count() == 0 && self.warning_count() == 0 {
            println!("✅ All checks passed!");
        } else {
            println!(
                "Summary: {} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            );
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let icon = match finding.severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    };
    let location = finding
        .location
        .as_ref()
        .map_or(String::new(), |l| format!(" [{l}]"));
    println!(
        "  {icon} [{}]{location}: {}",
        finding.category, finding.message
    );
}

// ============================================================================
// Checks
// ============================================================================

/// Checks that need nothing but the parsed configuration.
pub fn check_config(config: &DatadashConfig) -> CheckResults {
    let mut results = CheckResults::default();

    if let Err(e) = config.validate() {
        results.add(CheckFinding::error("structure", e.to_string()));
    }

    for table in &config.tables {
        let location = format!("tables.{}", table.ident);

        if let Some(lookup) = table.fields.iter().find(|f| f.name == table.lookup_field)
            && !lookup.read_only
        {
            results.add(
                CheckFinding::warning(
                    "lookup",
                    format!(
                        "lookup field '{}' is editable; saving a new value moves the row to another URL",
                        lookup.name
                    ),
                )
                .with_location(&location),
            );
        }

        for field in &table.fields {
            let auto = field.default == Some(DefaultConfig::AutoIncrement);
            if auto && field.kind != FieldKind::Integer {
                results.add(
                    CheckFinding::error(
                        "defaults",
                        format!("field '{}' is auto_increment but not an integer", field.name),
                    )
                    .with_location(&location),
                );
            }
            if auto && table.backend == BackendKind::Postgres {
                results.add(
                    CheckFinding::info(
                        "defaults",
                        format!(
                            "field '{}' is generated by the database; auto_increment is ignored",
                            field.name
                        ),
                    )
                    .with_location(&location),
                );
            }
        }

        if table.backend == BackendKind::Memory && table.table.is_some() {
            results.add(
                CheckFinding::warning("backend", "'table' only applies to postgres tables")
                    .with_location(&location),
            );
        }
    }

    results
}

/// Compare every Postgres table with the live database.
pub async fn check_database(config: &DatadashConfig, results: &mut CheckResults) -> Result<()> {
    let Some(database) = &config.database else {
        return Ok(());
    };
    if !config.needs_database() {
        return Ok(());
    }

    let pool = datadash_adapter_pg::connect(database)
        .await
        .context("database connection failed")?;

    for table in config
        .tables
        .iter()
        .filter(|t| t.backend == BackendKind::Postgres)
    {
        let pg_table = PgTable {
            relation: table.table_name().to_string(),
            schema: table.schema(),
            lookup_field: table.lookup_field.clone(),
            tie_break: table.tie_break.clone(),
        };
        for issue in verify_table(&pool, &pg_table).await? {
            results.add(
                CheckFinding::error("database", issue.to_string())
                    .with_location(format!("tables.{}", table.ident)),
            );
        }
    }
    Ok(())
}

pub async fn run(config_path: &Path, connect: bool) -> Result<()> {
    println!("🔍 Checking {}...", config_path.display());

    let config = DatadashConfig::from_file(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;

    let mut results = check_config(&config);
    if connect {
        println!("  🔌 Comparing postgres tables with the database...");
        check_database(&config, &mut results).await?;
    } else if config.needs_database() {
        results.add(CheckFinding::info(
            "database",
            "postgres tables were not verified; pass --connect to compare them",
        ));
    }

    results.print_summary();

    if results.has_errors() {
        anyhow::bail!("configuration has {} error(s)", results.error_count());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(yaml: &str) -> CheckResults {
        check_config(&DatadashConfig::from_yaml(yaml).unwrap())
    }

    #[test]
    fn test_clean_config_passes() {
        let results = check(
            r#"
tables:
  - ident: users
    fields:
      - { name: pk, kind: integer, read_only: true, default: auto_increment }
      - { name: username, required: true }
"#,
        );
        assert!(results.findings.is_empty());
    }

    #[test]
    fn test_structure_errors_reported() {
        let results = check(
            r#"
tables:
  - ident: users
    lookup_field: id
    fields:
      - { name: pk, kind: integer }
"#,
        );
        assert!(results.has_errors());
        assert_eq!(results.findings[0].category, "structure");
    }

    #[test]
    fn test_editable_lookup_warns() {
        let results = check(
            r#"
tables:
  - ident: tags
    lookup_field: slug
    fields:
      - { name: slug }
"#,
        );
        assert!(!results.has_errors());
        assert_eq!(results.warning_count(), 1);
        assert_eq!(results.findings[0].location.as_deref(), Some("tables.tags"));
    }

    #[test]
    fn test_auto_increment_on_string_is_error() {
        let results = check(
            r#"
tables:
  - ident: tags
    fields:
      - { name: pk, read_only: true, default: auto_increment }
"#,
        );
        assert_eq!(results.error_count(), 1);
        assert_eq!(results.findings[0].category, "defaults");
    }

    #[test]
    fn test_postgres_auto_increment_is_info() {
        let results = check(
            r#"
database: { url: "postgres://localhost/app" }
tables:
  - ident: orders
    backend: postgres
    fields:
      - { name: pk, kind: integer, read_only: true, default: auto_increment }
"#,
        );
        assert!(!results.has_errors());
        assert_eq!(results.findings.len(), 1);
        assert_eq!(results.findings[0].severity, Severity::Info);
    }
}

//! `datadash demo` command implementation.
//!
//! Serves a `users` table held in memory and filled with generated rows, so
//! the dashboard can be tried without a database or a configuration file.

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use datadash_core::{DashboardConfig, Field, FieldDefault, FieldKind, Record, Schema};
use datadash_dashboard::{AppState, DashboardServer, DashboardTable};
use datadash_runtime::{DataSource, MemoryStore};
use serde_json::{Value, json};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Brian", "Chloe", "Dmitri", "Elena", "Farid", "Grace", "Hiro", "Ines", "Jonas", "Keiko",
    "Luis",
];

const LAST_NAMES: &[&str] = &[
    "Okafor", "Lindqvist", "Moreau", "Tanaka", "Novak", "Haddad", "Silva", "Brennan",
];

fn users_schema() -> Schema {
    Schema::new(vec![
        Field::new("pk", FieldKind::Integer)
            .title("ID")
            .read_only()
            .auto_increment(),
        Field::new("username", FieldKind::String)
            .required()
            .max_length(50),
        Field::new("full_name", FieldKind::String).max_length(100),
        Field::new("bio", FieldKind::Text),
        Field::new("is_admin", FieldKind::Boolean)
            .default_value(FieldDefault::Value(Value::Bool(false))),
        Field::new("joined", FieldKind::Datetime)
            .default_value(FieldDefault::Now),
    ])
}

/// Generated row `n`, starting at 1. Rows are deterministic.
fn user_row(n: usize) -> Record {
    let first = FIRST_NAMES[n % FIRST_NAMES.len()];
    let last = LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()];
    let base = Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).single().unwrap_or_default();
    let joined = base + Duration::hours(n as i64 * 37);

    let row = json!({
        "pk": n,
        "username": format!("{}{n}", first.to_lowercase()),
        "full_name": format!("{first} {last}"),
        "bio": if n % 3 == 0 { String::new() } else { format!("Joined the {last} team.") },
        "is_admin": n % 7 == 0,
        "joined": joined.to_rfc3339(),
    });
    match row {
        Value::Object(record) => record,
        _ => Record::new(),
    }
}

/// The demo table with `rows` generated users, oldest first in the seed so
/// the newest appear first in the list.
pub fn demo_table(rows: usize) -> Result<DashboardTable> {
    let store = MemoryStore::new("users", users_schema())
        .with_tie_break(Some("pk".to_string()))
        .with_rows((1..=rows).map(user_row).collect())?;
    Ok(DashboardTable::new("users", "Users", DataSource::from_store(store)))
}

pub async fn run(port: u16, rows: usize) -> Result<()> {
    let table = demo_table(rows)?;
    tracing::info!(rows, "generated demo table");

    let config = DashboardConfig {
        port,
        ..DashboardConfig::default()
    };
    println!("🚀 Demo dashboard at http://{}/", config.bind_address());
    DashboardServer::new(config, AppState::new(vec![table]))
        .run()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_deterministic_and_valid() {
        let schema = users_schema();
        for n in 1..=40 {
            let row = user_row(n);
            assert_eq!(row, user_row(n));
            assert!(row.keys().all(|k| schema.contains(k)));
        }
        assert_eq!(user_row(1)["username"], "brian1");
        assert_eq!(user_row(14)["is_admin"], true);
    }

    #[tokio::test]
    async fn test_demo_table_paginates() {
        let table = demo_table(25).unwrap();
        assert_eq!(table.page_size, 10);
        assert_eq!(table.source.count().await.unwrap(), 25);

        let newest = table.source.get().await.unwrap().unwrap();
        assert_eq!(newest.key(), Some(&json!(25)));

        let created = table
            .source
            .create(
                [("username".to_string(), json!("zoe"))]
                    .into_iter()
                    .collect(),
            )
            .await
            .unwrap();
        assert_eq!(created.key(), Some(&json!(26)));
        assert_eq!(created.get("is_admin"), Some(&json!(false)));
    }
}

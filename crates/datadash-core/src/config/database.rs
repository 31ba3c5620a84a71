//! Database connection configuration.
//!
//! Three configuration methods are supported, in order of precedence:
//! 1. `url_env` - reference an environment variable holding the URL
//! 2. `url` - provide the URL directly
//! 3. Individual fields (host, port, database, username, password)

use serde::{Deserialize, Serialize};

/// Connection settings for tables backed by Postgres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Environment variable name containing the PostgreSQL connection URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_env: Option<String>,

    /// Full PostgreSQL connection URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Hostname of the Postgres server.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the Postgres server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name to connect to.
    #[serde(default = "default_database")]
    pub database: String,

    /// Username for the connection.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password for the connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Timeout in seconds when acquiring a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url_env: None,
            url: None,
            host: default_host(),
            port: default_port(),
            database: default_database(),
            username: default_username(),
            password: None,
            password_env: None,
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

impl DatabaseConfig {
    /// Build a PostgreSQL connection string from this configuration.
    pub fn connection_string(&self) -> String {
        if let Some(env_var) = &self.url_env
            && let Ok(url) = std::env::var(env_var)
        {
            return url;
        }

        if let Some(url) = &self.url {
            return url.clone();
        }

        match self.get_password() {
            Some(password) => format!(
                "postgresql://{}:{}@{}:{}/{}",
                self.username, password, self.host, self.port, self.database
            ),
            None => format!(
                "postgresql://{}@{}:{}/{}",
                self.username, self.host, self.port, self.database
            ),
        }
    }

    /// Get the password, checking password_env first.
    fn get_password(&self) -> Option<String> {
        if let Some(env_var) = &self.password_env
            && let Ok(password) = std::env::var(env_var)
        {
            return Some(password);
        }
        self.password.clone()
    }

    /// Connection string with any password masked, for logging.
    pub fn redacted(&self) -> String {
        let raw = self.connection_string();
        match url::Url::parse(&raw) {
            Ok(mut parsed) if parsed.password().is_some() => {
                match parsed.set_password(Some("****")) {
                    Ok(()) => parsed.to_string(),
                    Err(()) => "<database url with hidden password>".to_string(),
                }
            }
            Ok(parsed) => parsed.to_string(),
            Err(_) => "<unparseable database url>".to_string(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    30
}

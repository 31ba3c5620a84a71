//! Dashboard server configuration.
//!
//! This module defines where the dashboard listens and the path prefix under
//! which the host application mounts it.

use serde::{Deserialize, Serialize};

/// Configuration for the dashboard HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Host to bind the dashboard to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix the standalone server nests the dashboard under (e.g. "/admin").
    /// Empty means mounted at the root. Links are always derived from the
    /// request path, so hosts nesting the router themselves can ignore this.
    #[serde(default)]
    pub base_path: String,

    /// Default number of rows per page for tables that don't set their own.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: String::new(),
            page_size: default_page_size(),
        }
    }
}

impl DashboardConfig {
    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The mount prefix without a trailing slash.
    pub fn normalized_base_path(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

pub(crate) fn default_page_size() -> usize {
    10
}

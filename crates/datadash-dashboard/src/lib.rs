//! # datadash-dashboard
//!
//! An embeddable admin dashboard over a set of named tables.
//!
//! For each table it serves a list view (search, column ordering,
//! GitHub-style pagination and a create form), a detail view with an edit
//! form, and a delete action. The router is plain axum, so a host
//! application can nest it under any prefix and wrap it with its own
//! authentication layers.
//!
//! ## Tech Stack
//!
//! - Axum for HTTP
//! - Server-side `format!` templates styled with Tailwind CSS
//! - `tower-http` request tracing

pub mod error;
pub mod forms;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

pub use error::DashboardError;
pub use forms::{FieldErrors, FormData, FormMode, FormValidator, SchemaValidator};
pub use routes::create_router;
pub use server::DashboardServer;
pub use state::{AppState, DashboardTable};

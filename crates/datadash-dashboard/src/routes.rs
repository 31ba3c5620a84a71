//! Route definitions for the dashboard.

use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get, routing::post};

/// Create the dashboard router.
///
/// Hosts mount it wherever they like, e.g. `Router::new().nest("/admin", router)`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/{table}",
            get(handlers::table_list).post(handlers::table_create),
        )
        .route(
            "/{table}/{ident}",
            get(handlers::item_detail).post(handlers::item_update),
        )
        .route("/{table}/{ident}/delete", post(handlers::item_delete))
        .with_state(state)
}

//! Request handlers for the dashboard.
//!
//! Links are built from the URI the request arrived with, so the router can
//! be nested under any prefix without further configuration.

use crate::error::DashboardError;
use crate::forms::{FieldErrors, FormData, FormMode, parse_key};
use crate::pages::{self, DetailView, ListView, TableSummary};
use crate::state::{AppState, DashboardTable};
use axum::extract::{OriginalUri, Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use datadash_core::value::display_text;
use datadash_core::{
    ListParams, RequestUrl, clamp_page, column_controls, page_controls_for_url, page_offset,
    total_pages,
};
use datadash_runtime::DataItem;

type HandlerResult<T = Response> = Result<T, DashboardError>;

fn request_url(uri: &Uri) -> RequestUrl {
    RequestUrl::parse(
        uri.path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path()),
    )
}

/// Drop `levels` trailing path segments.
fn parent_path(path: &str, levels: usize) -> String {
    let mut parent = path.trim_end_matches('/');
    for _ in 0..levels {
        parent = parent.rsplit_once('/').map_or("", |(head, _)| head);
    }
    parent.to_string()
}

fn index_path(parent: &str) -> String {
    if parent.is_empty() {
        "/".to_string()
    } else {
        parent.to_string()
    }
}

fn find_table<'a>(state: &'a AppState, ident: &str) -> HandlerResult<&'a DashboardTable> {
    state
        .table(ident)
        .ok_or_else(|| DashboardError::NotFound(format!("no table named '{ident}'")))
}

async fn find_item(table: &DashboardTable, ident: &str) -> HandlerResult<DataItem> {
    let not_found = || DashboardError::NotFound(format!("no row '{ident}' in '{}'", table.ident));
    let source = &table.source;
    let key = parse_key(source.schema().field(source.lookup_field()), ident).ok_or_else(not_found)?;
    source.get_by_key(key).await?.ok_or_else(not_found)
}

fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

// =============================================================================
// Index
// =============================================================================

/// `GET /`: every table with its row count.
pub async fn index(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> HandlerResult<Html<String>> {
    let base = uri.path().trim_end_matches('/');
    let mut summaries = Vec::with_capacity(state.tables().len());
    for table in state.tables() {
        summaries.push(TableSummary {
            title: table.title.clone(),
            url: format!("{base}/{}", pages::path_segment(&table.ident)),
            count: table.source.count().await?,
        });
    }
    Ok(Html(pages::index_page(&summaries)))
}

// =============================================================================
// List + create
// =============================================================================

/// `GET /{table}`: one page of rows with search, ordering and pagination.
pub async fn table_list(
    State(state): State<AppState>,
    Path(ident): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> HandlerResult {
    let table = find_table(&state, &ident)?;
    render_list(table, &uri, &FormData::new(), &FieldErrors::new(), StatusCode::OK).await
}

/// `POST /{table}`: create a row, then redirect back to the list.
pub async fn table_create(
    State(state): State<AppState>,
    Path(ident): Path<String>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<FormData>,
) -> HandlerResult {
    let table = find_table(&state, &ident)?;
    match state
        .validator()
        .validate(table.source.schema(), &form, FormMode::Create)
    {
        Ok(record) => {
            let item = table.source.create(record).await?;
            tracing::debug!(table = %table.ident, key = ?item.key(), "created row from form");
            Ok(see_other(&request_url(&uri).to_string()))
        }
        Err(errors) => render_list(table, &uri, &form, &errors, StatusCode::BAD_REQUEST).await,
    }
}

async fn render_list(
    table: &DashboardTable,
    uri: &Uri,
    form_values: &FormData,
    form_errors: &FieldErrors,
    status: StatusCode,
) -> HandlerResult {
    let url = request_url(uri);
    let params = ListParams::from_url(&url);
    let columns = table.source.schema().columns();

    let mut source = table.source.clone();
    if let Some(term) = &params.search {
        source = source.search(term.clone());
    }

    let count = source.count().await?;
    let pages = total_pages(count, table.page_size);
    let page = clamp_page(params.page, pages);

    let ordering = params.ordering(&columns);
    if let Some(order) = &ordering {
        source = source.ordered(order.clone())?;
    }

    let rows: Vec<_> = source
        .offset(page_offset(page, table.page_size))
        .limit(table.page_size)
        .all()
        .await?
        .into_iter()
        .map(DataItem::into_record)
        .collect();

    let page_controls = page_controls_for_url(&url, page, pages)?;
    let column_controls = column_controls(&url, &columns, ordering.as_ref());
    let index_url = index_path(&parent_path(url.path(), 1));
    let list_url = url.to_string();

    let html = pages::list_page(&ListView {
        title: &table.title,
        index_url: &index_url,
        list_path: url.path(),
        list_url: &list_url,
        schema: table.source.schema(),
        lookup_field: table.source.lookup_field(),
        search: params.search.as_deref(),
        count,
        columns: &column_controls,
        rows: &rows,
        page_controls: &page_controls,
        form_values,
        form_errors,
    });
    Ok((status, Html(html)).into_response())
}

// =============================================================================
// Detail + update + delete
// =============================================================================

/// `GET /{table}/{ident}`: the row with its edit form.
pub async fn item_detail(
    State(state): State<AppState>,
    Path((table_ident, ident)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> HandlerResult {
    let table = find_table(&state, &table_ident)?;
    let item = find_item(table, &ident).await?;
    Ok(render_detail(table, &item, uri.path(), None, &FieldErrors::new(), StatusCode::OK))
}

/// `POST /{table}/{ident}`: update the row, then redirect back to it.
pub async fn item_update(
    State(state): State<AppState>,
    Path((table_ident, ident)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<FormData>,
) -> HandlerResult {
    let table = find_table(&state, &table_ident)?;
    let mut item = find_item(table, &ident).await?;
    match state
        .validator()
        .validate(table.source.schema(), &form, FormMode::Update)
    {
        Ok(changes) => {
            item.update(changes).await?;
            tracing::debug!(table = %table.ident, key = %ident, "updated row from form");
            Ok(see_other(uri.path()))
        }
        Err(errors) => Ok(render_detail(
            table,
            &item,
            uri.path(),
            Some(&form),
            &errors,
            StatusCode::BAD_REQUEST,
        )),
    }
}

/// `POST /{table}/{ident}/delete`: remove the row and return to the list.
pub async fn item_delete(
    State(state): State<AppState>,
    Path((table_ident, ident)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> HandlerResult {
    let table = find_table(&state, &table_ident)?;
    let item = find_item(table, &ident).await?;
    item.delete().await?;
    tracing::debug!(table = %table.ident, key = %ident, "deleted row");
    Ok(see_other(&parent_path(uri.path(), 2)))
}

fn render_detail(
    table: &DashboardTable,
    item: &DataItem,
    detail_path: &str,
    submitted: Option<&FormData>,
    form_errors: &FieldErrors,
    status: StatusCode,
) -> Response {
    let table_url = parent_path(detail_path, 1);
    let index_url = index_path(&parent_path(detail_path, 2));
    let key_text = item.key().map(display_text).unwrap_or_default();
    let detail_url = detail_path.trim_end_matches('/');

    let html = pages::detail_page(&DetailView {
        table_title: &table.title,
        index_url: &index_url,
        table_url: &table_url,
        detail_url,
        schema: table.source.schema(),
        record: item.record(),
        key_text: &key_text,
        submitted,
        form_errors,
    });
    (status, Html(html)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/admin/users/3/delete", 2), "/admin/users");
        assert_eq!(parent_path("/users/3", 1), "/users");
        assert_eq!(parent_path("/users", 1), "");
        assert_eq!(parent_path("/users/", 1), "");
        assert_eq!(index_path(&parent_path("/users", 1)), "/");
        assert_eq!(index_path(&parent_path("/admin/users", 1)), "/admin");
    }

    #[test]
    fn test_request_url_keeps_query() {
        let uri: Uri = "/users?page=2&search=tom".parse().unwrap();
        let url = request_url(&uri);
        assert_eq!(url.path(), "/users");
        assert_eq!(url.get("page"), Some("2"));
    }
}
